//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{RdsDataConfig, RetryPolicy};
pub use crate::connection::RdsDataConnection;
pub use crate::error::{ErrorCategory, RdsDataError, TransportError};
pub use crate::field::Field;
pub use crate::params::{ParamKey, ParameterBag};
pub use crate::results::{
    ColumnDescriptor, DynamicObject, FetchedRow, FieldAssignable, RdsDataResult, Row,
};
pub use crate::statement::Statement;
pub use crate::transport::{
    BeginTransactionRequest, BeginTransactionResponse, ColumnMetadata, CommitTransactionRequest,
    ExecuteStatementRequest, ExecuteStatementResponse, RdsDataTransport, ResultSetOptions,
    RollbackTransactionRequest, SqlParameter, TransactionStatusResponse,
};
pub use crate::types::{FetchMode, ParameterType, Value};

#[cfg(any(test, feature = "test-utils"))]
pub use crate::test_utils::{MockTransport, RecordedRequest};
