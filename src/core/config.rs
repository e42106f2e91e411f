//! Logger configuration

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::logger::{DEFAULT_IDLE_WAIT, DEFAULT_QUEUE_CAPACITY};
use serde::{Deserialize, Serialize};

/// Serializable logger settings; missing fields take their defaults
///
/// # Example
///
/// ```
/// use zerolog::{LoggerConfig, LogLevel};
///
/// let config = LoggerConfig::from_json_str(
///     r#"{ "name": "ingest", "min_level": "Info", "queue_capacity": 4096 }"#,
/// ).unwrap();
///
/// assert_eq!(config.min_level, LogLevel::Info);
/// assert!(config.async_mode);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub name: String,
    pub min_level: LogLevel,
    pub async_mode: bool,
    /// Queue slots; power of two
    pub queue_capacity: usize,
    pub idle_wait_micros: u64,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: "zerolog".to_string(),
            min_level: LogLevel::Trace,
            async_mode: true,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_wait_micros: DEFAULT_IDLE_WAIT.as_micros() as u64,
        }
    }
}

impl LoggerConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(LoggerError::config("LoggerConfig", "name must not be empty"));
        }
        if self.async_mode && !self.queue_capacity.is_power_of_two() {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!(
                    "queue_capacity must be a power of two, got {}",
                    self.queue_capacity
                ),
            ));
        }
        if self.async_mode && self.idle_wait_micros == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "idle_wait_micros must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = LoggerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queue_capacity, 65536);
        assert_eq!(config.idle_wait_micros, 100);
    }

    #[test]
    fn test_rejects_non_power_of_two_capacity() {
        let config = LoggerConfig {
            queue_capacity: 1000,
            ..LoggerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));

        let config = LoggerConfig {
            queue_capacity: 0,
            ..LoggerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sync_mode_ignores_capacity() {
        let config = LoggerConfig {
            async_mode: false,
            queue_capacity: 3,
            ..LoggerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = LoggerConfig::from_json_str(r#"{ "async_mode": false }"#).unwrap();
        assert_eq!(config.name, "zerolog");
        assert!(!config.async_mode);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            LoggerConfig::from_json_str("{ not json"),
            Err(LoggerError::ConfigParse(_))
        ));
        assert!(matches!(
            LoggerConfig::from_json_str(r#"{ "queue_capacity": 12 }"#),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = LoggerConfig {
            name: "svc".to_string(),
            min_level: LogLevel::Error,
            ..LoggerConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(LoggerConfig::from_json_str(&json).unwrap(), config);
    }
}
