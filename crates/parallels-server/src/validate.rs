//! Boundary defaults and validation for incoming batches.

use parallels_config::DispatchConfig;
use parallels_dispatch::{ExecutionRequest, MAX_TIMEOUT_SECS};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  #[error("webhook_url is required")]
  MissingUrl,

  #[error("webhook_url is not a valid URL: {message}")]
  InvalidUrl { message: String },

  #[error("webhook_url must use http or https, got {scheme}")]
  UnsupportedScheme { scheme: String },

  #[error("payloads array cannot be empty")]
  EmptyPayloads,
}

/// Apply boundary defaults to `request` and reject what cannot be dispatched.
///
/// A zero timeout becomes `config.default_timeout`; anything above
/// [`MAX_TIMEOUT_SECS`] is clamped.
pub fn prepare(
  mut request: ExecutionRequest,
  config: &DispatchConfig,
) -> Result<ExecutionRequest, ValidationError> {
  if request.timeout == 0 {
    request.timeout = config.default_timeout;
  }
  request.timeout = request.timeout.min(MAX_TIMEOUT_SECS);

  request.webhook_url = request.webhook_url.trim().to_string();
  if request.webhook_url.is_empty() {
    return Err(ValidationError::MissingUrl);
  }

  let url = Url::parse(&request.webhook_url).map_err(|e| ValidationError::InvalidUrl {
    message: e.to_string(),
  })?;
  match url.scheme() {
    "http" | "https" => {}
    other => {
      return Err(ValidationError::UnsupportedScheme {
        scheme: other.to_string(),
      });
    }
  }

  if request.payloads.is_empty() {
    return Err(ValidationError::EmptyPayloads);
  }

  Ok(request)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn request(url: &str, payloads: usize, timeout: u64) -> ExecutionRequest {
    ExecutionRequest {
      webhook_url: url.to_string(),
      auth_header: String::new(),
      payloads: (0..payloads)
        .map(|i| json!({ "i": i }).as_object().cloned().unwrap())
        .collect(),
      timeout,
    }
  }

  #[test]
  fn test_zero_timeout_uses_configured_default() {
    let config = DispatchConfig {
      default_timeout: 45,
      ..DispatchConfig::default()
    };

    let prepared = prepare(request("http://localhost/hook", 1, 0), &config).unwrap();
    assert_eq!(prepared.timeout, 45);
  }

  #[test]
  fn test_large_timeout_is_clamped() {
    let prepared =
      prepare(request("https://example.com/hook", 1, 86_400), &DispatchConfig::default()).unwrap();
    assert_eq!(prepared.timeout, MAX_TIMEOUT_SECS);
  }

  #[test]
  fn test_explicit_timeout_is_kept() {
    let prepared =
      prepare(request("https://example.com/hook", 1, 7), &DispatchConfig::default()).unwrap();
    assert_eq!(prepared.timeout, 7);
  }

  #[test]
  fn test_rejects_missing_url() {
    let err = prepare(request("  ", 1, 0), &DispatchConfig::default()).unwrap_err();
    assert_eq!(err, ValidationError::MissingUrl);
  }

  #[test]
  fn test_rejects_relative_url() {
    let err = prepare(request("/hook", 1, 0), &DispatchConfig::default()).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidUrl { .. }));
  }

  #[test]
  fn test_rejects_non_http_scheme() {
    let err = prepare(request("ftp://example.com/hook", 1, 0), &DispatchConfig::default()).unwrap_err();
    assert_eq!(
      err,
      ValidationError::UnsupportedScheme {
        scheme: "ftp".to_string()
      }
    );
  }

  #[test]
  fn test_rejects_empty_payloads() {
    let err = prepare(request("http://localhost/hook", 0, 0), &DispatchConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "payloads array cannot be empty");
  }
}
