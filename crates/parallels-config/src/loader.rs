//! Loading configuration from files and the environment.

use std::path::Path;
use std::str::FromStr;

use crate::config::Config;
use crate::error::ConfigError;

impl Config {
  /// Defaults overridden by process environment variables.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::default().with_overrides(|key| std::env::var(key).ok())
  }

  /// Read a JSON config file, then apply environment overrides.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    Self::read_file(path)?.with_overrides(|key| std::env::var(key).ok())
  }

  /// Read a JSON config file without consulting the environment.
  ///
  /// Settings missing from the file keep their defaults.
  pub fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Apply overrides from `lookup`. Empty values count as unset.
  ///
  /// Numeric values that do not parse are ignored and the current value is
  /// kept; an unknown log level or format is an error.
  pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(host) = get("HOST") {
      self.server.host = host;
    }
    override_number(&mut self.server.port, get("PORT"));
    override_number(&mut self.server.read_timeout, get("READ_TIMEOUT"));
    override_number(&mut self.server.shutdown_timeout, get("SHUTDOWN_TIMEOUT"));

    if let Some(level) = get("LOG_LEVEL") {
      self.logger.level = level.parse()?;
    }
    if let Some(format) = get("LOG_FORMAT") {
      self.logger.format = format.parse()?;
    }

    override_number(&mut self.dispatch.default_timeout, get("DEFAULT_TIMEOUT"));
    override_number(&mut self.dispatch.deadline_margin, get("DEADLINE_MARGIN"));
    if let Some(user_agent) = get("USER_AGENT") {
      self.dispatch.user_agent = user_agent;
    }

    Ok(self)
  }
}

fn override_number<T: FromStr>(target: &mut T, value: Option<String>) {
  if let Some(parsed) = value.and_then(|v| v.trim().parse().ok()) {
    *target = parsed;
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;
  use crate::config::{LogFormat, LogLevel};

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key: &str| vars.get(key).cloned()
  }

  #[test]
  fn test_overrides_apply() {
    let config = Config::default()
      .with_overrides(lookup(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "9090"),
        ("READ_TIMEOUT", "10"),
        ("SHUTDOWN_TIMEOUT", "15"),
        ("LOG_LEVEL", "debug"),
        ("LOG_FORMAT", "json"),
        ("DEFAULT_TIMEOUT", "120"),
        ("DEADLINE_MARGIN", "2"),
        ("USER_AGENT", "custom/1.0"),
      ]))
      .unwrap();

    assert_eq!(config.server.addr(), "127.0.0.1:9090");
    assert_eq!(config.server.read_timeout, 10);
    assert_eq!(config.server.shutdown_timeout, 15);
    assert_eq!(config.logger.level, LogLevel::Debug);
    assert_eq!(config.logger.format, LogFormat::Json);
    assert_eq!(config.dispatch.default_timeout, 120);
    assert_eq!(config.dispatch.deadline_margin, 2);
    assert_eq!(config.dispatch.user_agent, "custom/1.0");
  }

  #[test]
  fn test_unparseable_numbers_keep_defaults() {
    let config = Config::default()
      .with_overrides(lookup(&[("PORT", "eighty"), ("READ_TIMEOUT", "-1")]))
      .unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.read_timeout, 30);
  }

  #[test]
  fn test_empty_values_are_ignored() {
    let config = Config::default()
      .with_overrides(lookup(&[("HOST", ""), ("LOG_LEVEL", "")]))
      .unwrap();

    assert_eq!(config, Config::default());
  }

  #[test]
  fn test_unknown_log_level_is_an_error() {
    let err = Config::default()
      .with_overrides(lookup(&[("LOG_LEVEL", "chatty")]))
      .unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { .. }));
  }
}
