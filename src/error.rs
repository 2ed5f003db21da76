use thiserror::Error;

use crate::classify::ErrorDescriptor;

/// Failure reported by the transport itself.
///
/// `BadRequest` is the only variant that carries a server-side SQL error message; the
/// statement executor routes it through the error classifier. Everything else is
/// surfaced unmodified as [`RdsDataError::Transport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service error {code}: {message}")]
    Service { code: String, message: String },

    #[error("Transport failure: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum RdsDataError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{message}")]
    Classified {
        code: u16,
        symbolic_name: &'static str,
        message: String,
    },

    #[error("{0}")]
    Unclassified(String),

    #[error("Unsupported parameter type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported field: {0}")]
    UnsupportedField(String),

    #[error("Malformed SQL: {0}")]
    MalformedSql(String),

    #[error("Ambiguous parameter numbering: {0}")]
    AmbiguousParameterNumbering(String),

    #[error("Unsupported fetch mode: {0}")]
    UnsupportedFetchMode(String),

    #[error("could not fetch as '{type_name}': {reason}")]
    ObjectMapping {
        type_name: &'static str,
        reason: String,
    },

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

/// Semantic buckets for classified server errors, following the MySQL driver conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Deadlock,
    LockWaitTimeout,
    TableExists,
    TableNotFound,
    ForeignKeyViolation,
    UniqueViolation,
    InvalidFieldName,
    NonUniqueFieldName,
    SyntaxError,
    ConnectionError,
    NotNullViolation,
    /// The proxy in front of the database lost its link (`PR_CONNECTION_ERROR`).
    ConnectionLost,
    /// Anything without a more specific bucket, including unclassified messages.
    Driver,
}

impl ErrorCategory {
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            1213 => ErrorCategory::Deadlock,
            1205 => ErrorCategory::LockWaitTimeout,
            1050 => ErrorCategory::TableExists,
            1051 | 1146 => ErrorCategory::TableNotFound,
            1216 | 1217 | 1451 | 1452 | 1701 => ErrorCategory::ForeignKeyViolation,
            1062 | 1557 | 1569 | 1586 => ErrorCategory::UniqueViolation,
            1054 | 1166 | 1611 => ErrorCategory::InvalidFieldName,
            1052 | 1060 | 1110 => ErrorCategory::NonUniqueFieldName,
            1064 | 1149 | 1287 | 1341 | 1342 | 1343 | 1344 | 1382 | 1479 | 1541 | 1554
            | 1626 => ErrorCategory::SyntaxError,
            1044 | 1045 | 1046 | 1049 | 1095 | 1142 | 1143 | 1227 | 1370 | 1429 | 2002
            | 2005 => ErrorCategory::ConnectionError,
            1048 | 1121 | 1138 | 1171 | 1252 | 1263 | 1364 | 1566 => {
                ErrorCategory::NotNullViolation
            }
            crate::classify::PROXY_CONNECTION_ERROR => ErrorCategory::ConnectionLost,
            _ => ErrorCategory::Driver,
        }
    }
}

impl RdsDataError {
    /// Build the server error for a bad-request message and its classification.
    pub(crate) fn from_server_message(message: String, descriptor: ErrorDescriptor) -> Self {
        match (descriptor.code, descriptor.symbolic_name) {
            (Some(code), Some(symbolic_name)) => RdsDataError::Classified {
                code,
                symbolic_name,
                message,
            },
            _ => RdsDataError::Unclassified(message),
        }
    }

    /// Server error code recovered from the message, if any.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        match self {
            RdsDataError::Classified { code, .. } => Some(*code),
            _ => None,
        }
    }

    #[must_use]
    pub fn symbolic_name(&self) -> Option<&'static str> {
        match self {
            RdsDataError::Classified { symbolic_name, .. } => Some(symbolic_name),
            _ => None,
        }
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            RdsDataError::Classified { code, .. } => ErrorCategory::from_code(*code),
            _ => ErrorCategory::Driver,
        }
    }

    /// True when the statement executor may re-issue the same request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::ConnectionLost
    }
}
