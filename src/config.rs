use std::time::Duration;

use serde::Deserialize;

use crate::error::RdsDataError;

/// Soft retry for statements failing with a lost proxy connection.
///
/// The same request is re-issued after a fixed delay, up to `max_retries` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Target cluster, credentials secret and default database of a connection.
///
/// Loads from JSON the way the service's own configuration is usually stored:
/// ```rust
/// use rds_data_middleware::prelude::*;
///
/// let config: RdsDataConfig = serde_json::from_str(r#"{
///     "resource_arn": "arn:aws:rds:eu-west-1:123456789012:cluster:app",
///     "secret_arn": "arn:aws:secretsmanager:eu-west-1:123456789012:secret:app",
///     "database": "app",
///     "retry": { "max_retries": 2, "delay_ms": 500 }
/// }"#)?;
/// config.validate()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RdsDataConfig {
    pub resource_arn: String,
    pub secret_arn: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl RdsDataConfig {
    #[must_use]
    pub fn new(
        resource_arn: impl Into<String>,
        secret_arn: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            resource_arn: resource_arn.into(),
            secret_arn: secret_arn.into(),
            database: database.into(),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// # Errors
    /// Returns `RdsDataError::ConfigError` if an ARN is missing.
    pub fn validate(&self) -> Result<(), RdsDataError> {
        if self.resource_arn.trim().is_empty() {
            return Err(RdsDataError::ConfigError(
                "resource_arn is required".to_string(),
            ));
        }
        if self.secret_arn.trim().is_empty() {
            return Err(RdsDataError::ConfigError("secret_arn is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_defaults_to_off() {
        let config: RdsDataConfig =
            serde_json::from_str(r#"{"resource_arn":"r","secret_arn":"s"}"#).unwrap();
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.database, "");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_arns_are_rejected() {
        let err = RdsDataConfig::new("", "s", "db").validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: resource_arn is required");
        let err = RdsDataConfig::new("r", " ", "db").validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: secret_arn is required");
    }

    #[test]
    fn retry_delay_round_trips() {
        let retry = RetryPolicy::new(3, Duration::from_millis(250));
        assert_eq!(retry.delay(), Duration::from_millis(250));
        assert_eq!(retry.max_retries, 3);
    }
}
