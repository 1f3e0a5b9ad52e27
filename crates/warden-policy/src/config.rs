//! Engine configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! policy_dir = "/etc/warden/policies"
//! file_suffix = ".policy"
//! skip_invalid_policies = true
//! emit_policy_logs = false
//!
//! [logging]
//! level = "info"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::loader::DEFAULT_SUFFIX;
use crate::manager::ManagerConfig;

/// Log levels accepted by [`LoggingConfig::level`].
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory scanned for policy files.
    pub policy_dir: PathBuf,

    /// Only files whose name ends with this suffix are loaded.
    pub file_suffix: String,

    /// Keep loading when a policy file fails to parse or register.
    /// When false, any failure aborts the load.
    pub skip_invalid_policies: bool,

    /// Emit each matched policy's log directives after a verdict.
    pub emit_policy_logs: bool,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy_dir: PathBuf::from("policies"),
            file_suffix: DEFAULT_SUFFIX.to_string(),
            skip_invalid_policies: true,
            emit_policy_logs: false,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl EngineConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `policy_dir` is empty
    /// - `file_suffix` is empty or contains a path separator
    /// - `logging.level` is not a known level
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy_dir.as_os_str().is_empty() {
            return Err(ConfigError::Missing("policy_dir".to_string()));
        }

        if self.file_suffix.is_empty() {
            return Err(ConfigError::InvalidValue(
                "file_suffix cannot be empty".to_string(),
            ));
        }
        if self.file_suffix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue(format!(
                "file_suffix '{}' must not contain a path separator",
                self.file_suffix
            )));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue(format!(
                "Invalid logging level: '{}'. Must be one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Manager settings derived from this configuration.
    #[must_use]
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            emit_policy_logs: self.emit_policy_logs,
            skip_invalid_policies: self.skip_invalid_policies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.file_suffix, ".policy");
        assert!(config.skip_invalid_policies);
    }

    #[test]
    fn test_empty_policy_dir_fails_validation() {
        let config = EngineConfig {
            policy_dir: PathBuf::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_bad_suffix_fails_validation() {
        for suffix in ["", "a/b"] {
            let config = EngineConfig {
                file_suffix: suffix.to_string(),
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("file_suffix"), "{suffix:?}");
        }
    }

    #[test]
    fn test_unknown_log_level_fails_validation() {
        let mut config = EngineConfig::default();
        config.logging.level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging level"));

        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            emit_policy_logs = true

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert!(config.emit_policy_logs);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.file_suffix, ".policy");
        assert_eq!(config.policy_dir, PathBuf::from("policies"));
    }

    #[test]
    fn test_manager_config() {
        let config = EngineConfig {
            emit_policy_logs: true,
            skip_invalid_policies: false,
            ..Default::default()
        };
        let manager = config.manager_config();
        assert!(manager.emit_policy_logs);
        assert!(!manager.skip_invalid_policies);
    }
}
