use std::io::Write;

use parallels_config::{Config, ConfigError, LogFormat, LogLevel};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
  let mut file = NamedTempFile::new().unwrap();
  file.write_all(content.as_bytes()).unwrap();
  file
}

#[test]
fn test_partial_file_keeps_defaults() {
  let file = write_config(r#"{ "server": { "port": 9000 }, "logger": { "format": "json" } }"#);

  let config = Config::read_file(file.path()).unwrap();

  assert_eq!(config.server.port, 9000);
  assert_eq!(config.server.host, "0.0.0.0");
  assert_eq!(config.server.shutdown_timeout, 30);
  assert_eq!(config.logger.level, LogLevel::Info);
  assert_eq!(config.logger.format, LogFormat::Json);
  assert_eq!(config.dispatch.default_timeout, 60);
}

#[test]
fn test_env_overrides_file_values() {
  let file = write_config(r#"{ "server": { "host": "10.0.0.1", "port": 9000 } }"#);

  let config = Config::read_file(file.path())
    .unwrap()
    .with_overrides(|key| (key == "PORT").then(|| "9100".to_string()))
    .unwrap();

  assert_eq!(config.server.host, "10.0.0.1");
  assert_eq!(config.server.port, 9100);
}

#[test]
fn test_missing_file() {
  let err = Config::read_file("/nonexistent/parallels.json").unwrap_err();
  assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_malformed_file() {
  let file = write_config("{ server: ");

  let err = Config::read_file(file.path()).unwrap_err();
  assert!(matches!(err, ConfigError::Parse { .. }));
  assert!(err.to_string().contains("failed to parse config file"));
}

#[test]
fn test_unknown_level_in_file_is_a_parse_error() {
  let file = write_config(r#"{ "logger": { "level": "chatty" } }"#);

  let err = Config::read_file(file.path()).unwrap_err();
  assert!(matches!(err, ConfigError::Parse { .. }));
}
