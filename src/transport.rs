//! The request/response contract of the stateless SQL execution service.
//!
//! Every call carries the full statement and the credentials; nothing is kept open between
//! calls except an optional transaction id handed out by `begin_transaction`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::field::Field;

/// A named parameter as sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlParameter {
    pub name: String,
    pub value: Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetOptions {
    pub decimal_return_type: String,
}

impl Default for ResultSetOptions {
    fn default() -> Self {
        Self {
            decimal_return_type: "STRING".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub sql: String,
    pub database: String,
    pub parameters: Vec<SqlParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub include_result_metadata: bool,
    pub continue_after_timeout: bool,
    pub result_set_options: ResultSetOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ColumnMetadata {
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementResponse {
    #[serde(default)]
    pub column_metadata: Vec<ColumnMetadata>,
    #[serde(default)]
    pub records: Vec<Vec<Field>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_records_updated: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated_fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginTransactionRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginTransactionResponse {
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitTransactionRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackTransactionRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusResponse {
    #[serde(default)]
    pub transaction_status: Option<String>,
}

/// The remote call abstraction. Implementations perform one HTTP (or other) round trip per
/// method and must not keep statement state of their own.
#[async_trait]
pub trait RdsDataTransport: Send + Sync {
    async fn execute_statement(
        &self,
        request: &ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, TransportError>;

    async fn begin_transaction(
        &self,
        request: &BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, TransportError>;

    async fn commit_transaction(
        &self,
        request: &CommitTransactionRequest,
    ) -> Result<TransactionStatusResponse, TransportError>;

    async fn rollback_transaction(
        &self,
        request: &RollbackTransactionRequest,
    ) -> Result<TransactionStatusResponse, TransportError>;
}
