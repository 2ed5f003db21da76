//! At most one live transaction per connection.

use tracing::{debug, info};

use crate::config::RdsDataConfig;
use crate::error::{RdsDataError, TransportError};
use crate::transport::{
    BeginTransactionRequest, CommitTransactionRequest, RdsDataTransport,
    RollbackTransactionRequest,
};

/// Tracks the id of the active transaction, if any.
///
/// `begin` while a transaction is active, and `commit`/`rollback` while none is, report
/// `Ok(false)` without calling the transport. The id is only cleared once the service
/// confirmed the commit or rollback.
#[derive(Debug, Default)]
pub struct TransactionController {
    transaction_id: Option<String>,
}

impl TransactionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.transaction_id.is_some()
    }

    /// # Errors
    /// Propagates the transport failure, or reports one if the service handed back no id.
    pub async fn begin(
        &mut self,
        transport: &dyn RdsDataTransport,
        config: &RdsDataConfig,
    ) -> Result<bool, RdsDataError> {
        if self.transaction_id.is_some() {
            debug!("begin ignored, a transaction is already active");
            return Ok(false);
        }

        let request = BeginTransactionRequest {
            resource_arn: config.resource_arn.clone(),
            secret_arn: config.secret_arn.clone(),
            database: Some(config.database.clone()),
        };
        let response = transport.begin_transaction(&request).await?;
        let id = response.transaction_id.ok_or_else(|| {
            TransportError::Other("begin_transaction returned no transaction id".to_string())
        })?;

        info!(transaction_id = %id, database = %config.database, "transaction started");
        self.transaction_id = Some(id);
        Ok(true)
    }

    /// # Errors
    /// Propagates the transport failure; the transaction then stays active.
    pub async fn commit(
        &mut self,
        transport: &dyn RdsDataTransport,
        config: &RdsDataConfig,
    ) -> Result<bool, RdsDataError> {
        let Some(id) = self.transaction_id.clone() else {
            return Ok(false);
        };

        let request = CommitTransactionRequest {
            resource_arn: config.resource_arn.clone(),
            secret_arn: config.secret_arn.clone(),
            transaction_id: id,
        };
        let response = transport.commit_transaction(&request).await?;

        info!(
            transaction_id = %request.transaction_id,
            status = response.transaction_status.as_deref().unwrap_or(""),
            "transaction committed"
        );
        self.transaction_id = None;
        Ok(true)
    }

    /// # Errors
    /// Propagates the transport failure; the transaction then stays active.
    pub async fn rollback(
        &mut self,
        transport: &dyn RdsDataTransport,
        config: &RdsDataConfig,
    ) -> Result<bool, RdsDataError> {
        let Some(id) = self.transaction_id.clone() else {
            return Ok(false);
        };

        let request = rollback_request(config, id);
        let response = transport.rollback_transaction(&request).await?;

        info!(
            transaction_id = %request.transaction_id,
            status = response.transaction_status.as_deref().unwrap_or(""),
            "transaction rolled back"
        );
        self.transaction_id = None;
        Ok(true)
    }

    /// Hand over the active id for a rollback that outlives the controller.
    pub(crate) fn take_for_teardown(&mut self) -> Option<String> {
        self.transaction_id.take()
    }
}

pub(crate) fn rollback_request(
    config: &RdsDataConfig,
    transaction_id: String,
) -> RollbackTransactionRequest {
    RollbackTransactionRequest {
        resource_arn: config.resource_arn.clone(),
        secret_arn: config.secret_arn.clone(),
        transaction_id,
    }
}
