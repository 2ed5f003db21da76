use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::config::RdsDataConfig;
use crate::error::RdsDataError;
use crate::statement::Statement;
use crate::transaction::{TransactionController, rollback_request};
use crate::transport::RdsDataTransport;
use crate::types::Value;

static SKIP_DROP_ROLLBACK: AtomicBool = AtomicBool::new(false);

/// A logical connection to one database behind the data service.
///
/// Nothing is held open remotely apart from an optional transaction, so dropping a
/// connection with a transaction still active spawns a best-effort rollback on the
/// current tokio runtime. Prefer [`RdsDataConnection::close`] where an `.await` is
/// possible.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use rds_data_middleware::prelude::*;
///
/// # async fn demo(transport: Arc<dyn RdsDataTransport>) -> Result<(), RdsDataError> {
/// let config = RdsDataConfig::new("arn:cluster", "arn:secret", "app");
/// let mut conn = RdsDataConnection::new(transport, config)?;
///
/// conn.begin_transaction().await?;
/// let mut stmt = conn.prepare("INSERT INTO users (name) VALUES (?)");
/// stmt.bind_value(0, "alice", ParameterType::String);
/// stmt.execute().await?;
/// drop(stmt);
/// conn.commit().await?;
///
/// let id = conn.last_insert_id().cloned();
/// # let _ = id;
/// # Ok(()) }
/// ```
pub struct RdsDataConnection {
    pub(crate) transport: Arc<dyn RdsDataTransport>,
    pub(crate) config: RdsDataConfig,
    pub(crate) transaction: TransactionController,
    pub(crate) last_insert_id: Option<Value>,
}

impl RdsDataConnection {
    /// # Errors
    /// Returns `RdsDataError::ConfigError` if the configuration is incomplete.
    pub fn new(
        transport: Arc<dyn RdsDataTransport>,
        config: RdsDataConfig,
    ) -> Result<Self, RdsDataError> {
        config.validate()?;
        Ok(Self {
            transport,
            config,
            transaction: TransactionController::new(),
            last_insert_id: None,
        })
    }

    /// Prepare a statement. Nothing is sent until it is executed.
    pub fn prepare(&mut self, sql: impl Into<String>) -> Statement<'_> {
        Statement::new(self, sql.into())
    }

    /// Prepare and execute a statement without parameters.
    ///
    /// # Errors
    /// Anything [`Statement::execute`] returns.
    pub async fn query(&mut self, sql: impl Into<String>) -> Result<Statement<'_>, RdsDataError> {
        let mut statement = self.prepare(sql);
        statement.execute().await?;
        Ok(statement)
    }

    /// Execute a statement without parameters and return the affected row count.
    ///
    /// # Errors
    /// Anything [`Statement::execute`] returns.
    pub async fn exec(&mut self, sql: impl Into<String>) -> Result<usize, RdsDataError> {
        let mut statement = self.prepare(sql);
        statement.execute().await?;
        Ok(statement.row_count())
    }

    /// Quote `input` as a SQL string literal.
    ///
    /// ASCII input is single-quoted with backslash escapes. Anything else is sent base64
    /// encoded inside `FROM_BASE64(...)` so no multi-byte sequence is ever escaped.
    /// Binding parameters is always preferable.
    #[must_use]
    pub fn quote(&self, input: &str) -> String {
        quote_literal(input)
    }

    /// # Errors
    /// Propagates transport failures.
    pub async fn begin_transaction(&mut self) -> Result<bool, RdsDataError> {
        self.transaction
            .begin(self.transport.as_ref(), &self.config)
            .await
    }

    /// # Errors
    /// Propagates transport failures; the transaction then stays active.
    pub async fn commit(&mut self) -> Result<bool, RdsDataError> {
        self.transaction
            .commit(self.transport.as_ref(), &self.config)
            .await
    }

    /// # Errors
    /// Propagates transport failures; the transaction then stays active.
    pub async fn rollback(&mut self) -> Result<bool, RdsDataError> {
        self.transaction
            .rollback(self.transport.as_ref(), &self.config)
            .await
    }

    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction.transaction_id()
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_active()
    }

    /// Generated identifier of the most recent insert that produced one.
    #[must_use]
    pub fn last_insert_id(&self) -> Option<&Value> {
        self.last_insert_id.as_ref()
    }

    /// Database statements run against.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.config.database
    }

    pub(crate) fn switch_database(&mut self, database: String) {
        info!(from = %self.config.database, to = %database, "switching database");
        self.config.database = database;
    }

    #[must_use]
    pub fn config(&self) -> &RdsDataConfig {
        &self.config
    }

    /// Roll back any active transaction and release the connection.
    ///
    /// # Errors
    /// Propagates a failed rollback.
    pub async fn close(mut self) -> Result<(), RdsDataError> {
        self.rollback().await.map(|_| ())
    }
}

impl std::fmt::Debug for RdsDataConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RdsDataConnection")
            .field("config", &self.config)
            .field("transaction", &self.transaction)
            .field("last_insert_id", &self.last_insert_id)
            .finish_non_exhaustive()
    }
}

fn skip_drop_rollback() -> bool {
    SKIP_DROP_ROLLBACK.load(Ordering::Relaxed)
}

impl Drop for RdsDataConnection {
    fn drop(&mut self) {
        let Some(transaction_id) = self.transaction.take_for_teardown() else {
            return;
        };
        if skip_drop_rollback() {
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            warn!(%transaction_id, "no tokio runtime to roll back transaction of dropped connection");
            return;
        };

        let transport = Arc::clone(&self.transport);
        let request = rollback_request(&self.config, transaction_id);
        handle.spawn(async move {
            if let Err(err) = transport.rollback_transaction(&request).await {
                warn!(
                    transaction_id = %request.transaction_id,
                    "rollback of dropped connection failed: {err}"
                );
            }
        });
    }
}

/// Test-only switch to leave transactions of dropped connections untouched.
#[doc(hidden)]
pub fn set_skip_drop_rollback_for_tests(skip: bool) {
    SKIP_DROP_ROLLBACK.store(skip, Ordering::Relaxed);
}

fn quote_literal(input: &str) -> String {
    if !input.is_ascii() {
        return format!("FROM_BASE64('{}')", BASE64.encode(input));
    }

    let mut quoted = String::with_capacity(input.len() + 2);
    quoted.push('\'');
    for c in input.chars() {
        match c {
            '\'' | '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\0' => quoted.push_str("\\0"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
