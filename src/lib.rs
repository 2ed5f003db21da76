//! Connection/prepare/execute/fetch on top of the stateless RDS Data API.
//!
//! The service takes one self-contained call per statement: the full SQL text, named and
//! typed parameters, and an optional transaction id. This crate rewrites positional `?`
//! placeholders into names, encodes values into the service's tagged fields, projects the
//! returned records into the usual fetch shapes and recovers MySQL error codes from the
//! free-text messages the service reports.
//!
//! The network call itself is left to an [`RdsDataTransport`] implementation.

pub mod classify;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
mod executor;
pub mod field;
pub mod params;
pub mod prelude;
pub mod results;
pub mod statement;
pub mod transaction;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use classify::{ErrorDescriptor, PROXY_CONNECTION_ERROR, classify};
pub use config::{RdsDataConfig, RetryPolicy};
pub use connection::{RdsDataConnection, set_skip_drop_rollback_for_tests};
pub use error::{ErrorCategory, RdsDataError, TransportError};
pub use executor::is_schema_statement;
pub use field::Field;
pub use params::{ParamKey, ParameterBag};
pub use results::{
    ColumnDescriptor, DynamicObject, FetchedRow, FieldAssignable, RdsDataResult, Row,
};
pub use statement::Statement;
pub use transaction::TransactionController;
pub use transport::RdsDataTransport;
pub use types::{FetchMode, ParameterType, Value};
