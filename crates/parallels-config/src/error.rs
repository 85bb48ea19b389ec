//! Configuration errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid value for {key}: {message}")]
  InvalidValue { key: String, message: String },
}

impl ConfigError {
  pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidValue {
      key: key.into(),
      message: message.into(),
    }
  }
}
