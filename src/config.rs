//! YAML configuration.
//!
//! One file describes both providers and the retry pacing. Loading returns
//! typed errors; the hosting process decides whether they are fatal.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::retry::BackoffPolicy;
use crate::storage::StoreConfig;

/// Configuration failures are permanent: nothing retries them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path} not found")]
    NotFound { path: String },

    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Retry pacing for the credential gates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    /// `None` waits indefinitely for credentials to exist.
    pub max_attempts: Option<usize>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = BackoffPolicy::default();
        Self {
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            multiplier: policy.multiplier,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            max_attempts: policy.max_attempts,
        }
    }
}

impl RetrySettings {
    /// Build the backoff policy these settings describe.
    pub fn policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            multiplier: self.multiplier,
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_attempts: self.max_attempts,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// First provider (the tie-break source on equal listings).
    pub provider_a: StoreConfig,
    /// Second provider.
    pub provider_b: StoreConfig,
    /// Gate retry pacing.
    #[serde(default)]
    pub retry: RetrySettings,
}

impl AppConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: display.clone(),
                }
            } else {
                ConfigError::Io {
                    path: display.clone(),
                    source: e,
                }
            }
        })?;

        let config: AppConfig = serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: display,
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate both providers without touching the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider_a
            .validate()
            .map_err(ConfigError::Invalid)?;
        self.provider_b
            .validate()
            .map_err(ConfigError::Invalid)?;
        if self.provider_a.name == self.provider_b.name {
            return Err(ConfigError::Invalid(format!(
                "providers must have distinct names, both are \"{}\"",
                self.provider_a.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageType;
    use std::io::Write;

    const FULL_CONFIG: &str = r#"
provider_a:
  name: aws
  type: s3
  bucket: first-bucket
  region: us-east-1
provider_b:
  name: gcp
  type: gcs
  bucket: second-bucket
retry:
  initial_delay_ms: 250
  max_attempts: 10
"#;

    #[test]
    fn parses_full_config() {
        let config: AppConfig = serde_yaml::from_str(FULL_CONFIG).unwrap();
        assert_eq!(config.provider_a.storage_type(), StorageType::S3);
        assert_eq!(config.provider_b.storage_type(), StorageType::Gcs);
        assert_eq!(config.retry.initial_delay_ms, 250);
        assert_eq!(config.retry.max_attempts, Some(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn retry_defaults_apply_when_absent() {
        let yaml = r#"
provider_a: { name: a, type: memory }
provider_b: { name: b, type: memory }
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.retry.max_attempts, None);
        let policy = config.retry.policy();
        assert_eq!(policy.initial_delay, Duration::from_millis(500));
    }

    #[test]
    fn duplicate_provider_names_are_invalid() {
        let yaml = r#"
provider_a: { name: same, type: memory }
provider_b: { name: same, type: memory }
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = AppConfig::load("/definitely/absent/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.provider_a.name, "aws");
    }

    #[test]
    fn parse_errors_carry_the_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"provider_a: [not, a, mapping]").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
