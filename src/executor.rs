//! One statement round trip: rewrite, encode, send, classify failures, materialize.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::config::RetryPolicy;
use crate::connection::RdsDataConnection;
use crate::error::{RdsDataError, TransportError};
use crate::params::ParameterBag;
use crate::results::RdsDataResult;
use crate::transport::{
    ExecuteStatementRequest, ExecuteStatementResponse, RdsDataTransport, ResultSetOptions,
};

// Schema changes can outlive the service's call timeout and are not transactional.
static DDL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(CREATE|DROP|ALTER|TRUNCATE)\s+(TABLE|INDEX|VIEW)")
        .map_err(|e| tracing::error!("DDL pattern failed to compile: {e}"))
        .ok()
});

/// Whether `sql` starts with a schema-definition keyword pair such as `CREATE TABLE`.
#[must_use]
pub fn is_schema_statement(sql: &str) -> bool {
    DDL.as_ref().is_some_and(|re| re.is_match(sql))
}

/// Execute `sql` with `params` on `connection`.
///
/// Records the generated identifier on the connection when the response carries one.
///
/// # Errors
/// Usage errors from rewriting or encoding, `RdsDataError::Classified` or
/// `RdsDataError::Unclassified` for bad requests, `RdsDataError::Transport` otherwise.
pub(crate) async fn execute(
    connection: &mut RdsDataConnection,
    sql: &str,
    params: &mut ParameterBag,
) -> Result<RdsDataResult, RdsDataError> {
    let rewritten = params.rewrite_statement(sql)?;
    let request = ExecuteStatementRequest {
        resource_arn: connection.config.resource_arn.clone(),
        secret_arn: connection.config.secret_arn.clone(),
        sql: rewritten.into_owned(),
        database: connection.config.database.clone(),
        parameters: params.build_parameter_list()?,
        transaction_id: connection.transaction.transaction_id().map(str::to_string),
        include_result_metadata: true,
        continue_after_timeout: is_schema_statement(sql),
        result_set_options: ResultSetOptions::default(),
    };

    let response = send_with_retry(
        connection.transport.as_ref(),
        &request,
        connection.config.retry,
    )
    .await?;

    let result = RdsDataResult::from(response);
    if let Some(id) = result.generated_identifier()? {
        connection.last_insert_id = Some(id);
    }
    Ok(result)
}

async fn send_with_retry(
    transport: &dyn RdsDataTransport,
    request: &ExecuteStatementRequest,
    retry: RetryPolicy,
) -> Result<ExecuteStatementResponse, RdsDataError> {
    let mut attempt = 0;
    loop {
        match send(transport, request).await {
            Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                attempt += 1;
                warn!(
                    attempt,
                    max_retries = retry.max_retries,
                    delay_ms = retry.delay_ms,
                    "retrying statement after lost connection: {err}"
                );
                tokio::time::sleep(retry.delay()).await;
            }
            outcome => return outcome,
        }
    }
}

async fn send(
    transport: &dyn RdsDataTransport,
    request: &ExecuteStatementRequest,
) -> Result<ExecuteStatementResponse, RdsDataError> {
    debug!(
        sql = %request.sql,
        parameters = request.parameters.len(),
        in_transaction = request.transaction_id.is_some(),
        continue_after_timeout = request.continue_after_timeout,
        "execute_statement"
    );

    match transport.execute_statement(request).await {
        Ok(response) => Ok(response),
        Err(TransportError::BadRequest(message)) => {
            let descriptor = classify(&message);
            Err(RdsDataError::from_server_message(message, descriptor))
        }
        Err(other) => Err(RdsDataError::Transport(other)),
    }
}
