use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const MAX_CALL_TIMEOUT_SECS: u64 = 3600;

/// Complete process configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub server: ServerConfig,
  pub logger: LoggerConfig,
  pub dispatch: DispatchConfig,
}

/// HTTP listener settings. Timeouts are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
  /// Limit for receiving a request body.
  pub read_timeout: u64,
  /// How long in-flight requests may run after a shutdown signal.
  pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host: "0.0.0.0".to_string(),
      port: 8080,
      read_timeout: 30,
      shutdown_timeout: 30,
    }
  }
}

impl ServerConfig {
  /// `host:port` for binding.
  pub fn addr(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }

  pub fn read_timeout(&self) -> Duration {
    Duration::from_secs(self.read_timeout)
  }

  pub fn shutdown_timeout(&self) -> Duration {
    Duration::from_secs(self.shutdown_timeout)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
  pub level: LogLevel,
  pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Debug,
  #[default]
  Info,
  Warn,
  Error,
}

impl LogLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "debug",
      Self::Info => "info",
      Self::Warn => "warn",
      Self::Error => "error",
    }
  }
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for LogLevel {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "debug" => Ok(Self::Debug),
      "info" => Ok(Self::Info),
      "warn" => Ok(Self::Warn),
      "error" => Ok(Self::Error),
      _ => Err(ConfigError::invalid(
        "log level",
        format!("'{}', must be one of debug, info, warn, error", s),
      )),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  #[default]
  Text,
  Json,
}

impl fmt::Display for LogFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Text => f.write_str("text"),
      Self::Json => f.write_str("json"),
    }
  }
}

impl FromStr for LogFormat {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      _ => Err(ConfigError::invalid(
        "log format",
        format!("'{}', must be 'text' or 'json'", s),
      )),
    }
  }
}

/// Settings applied to every batch. Timeouts are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
  /// Per-call timeout used when a request leaves it unset.
  pub default_timeout: u64,
  /// Added to the per-call timeout to form the batch deadline, so the batch
  /// never preempts a call's own timeout.
  pub deadline_margin: u64,
  /// `User-Agent` sent on outbound calls.
  pub user_agent: String,
}

impl Default for DispatchConfig {
  fn default() -> Self {
    Self {
      default_timeout: 60,
      deadline_margin: 5,
      user_agent: concat!("parallels/", env!("CARGO_PKG_VERSION")).to_string(),
    }
  }
}

impl DispatchConfig {
  pub fn deadline_margin(&self) -> Duration {
    Duration::from_secs(self.deadline_margin)
  }
}

impl Config {
  /// Check value ranges that serde and the env parser cannot express.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.server.port == 0 {
      return Err(ConfigError::invalid(
        "port",
        "0, must be between 1 and 65535",
      ));
    }
    if self.server.host.trim().is_empty() {
      return Err(ConfigError::invalid("host", "must not be empty"));
    }
    if self.server.read_timeout == 0 {
      return Err(ConfigError::invalid(
        "read_timeout",
        "must be greater than 0",
      ));
    }
    if self.server.shutdown_timeout == 0 {
      return Err(ConfigError::invalid(
        "shutdown_timeout",
        "must be greater than 0",
      ));
    }
    if self.dispatch.default_timeout == 0 || self.dispatch.default_timeout > MAX_CALL_TIMEOUT_SECS {
      return Err(ConfigError::invalid(
        "default_timeout",
        format!(
          "{}, must be between 1 and {}",
          self.dispatch.default_timeout, MAX_CALL_TIMEOUT_SECS
        ),
      ));
    }
    if self.dispatch.deadline_margin == 0 {
      return Err(ConfigError::invalid(
        "deadline_margin",
        "must be greater than 0",
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_are_valid() {
    let config = Config::default();

    assert_eq!(config.server.addr(), "0.0.0.0:8080");
    assert_eq!(config.logger.level, LogLevel::Info);
    assert_eq!(config.logger.format, LogFormat::Text);
    assert_eq!(config.dispatch.default_timeout, 60);
    assert_eq!(config.dispatch.deadline_margin, 5);
    assert!(config.dispatch.user_agent.starts_with("parallels/"));
    config.validate().unwrap();
  }

  #[test]
  fn test_validate_rejects_zero_port() {
    let mut config = Config::default();
    config.server.port = 0;

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("port"));
  }

  #[test]
  fn test_validate_rejects_zero_timeouts() {
    let mut config = Config::default();
    config.server.read_timeout = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.server.shutdown_timeout = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.dispatch.deadline_margin = 0;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_validate_bounds_default_timeout() {
    let mut config = Config::default();
    config.dispatch.default_timeout = 3601;
    assert!(config.validate().is_err());

    config.dispatch.default_timeout = 3600;
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_log_level_parsing() {
    assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert!("verbose".parse::<LogLevel>().is_err());
  }

  #[test]
  fn test_log_format_parsing() {
    assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    assert!("yaml".parse::<LogFormat>().is_err());
  }
}
