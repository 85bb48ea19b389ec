//! Server errors and their HTTP rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// JSON body of every error answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
  pub error: String,
  pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
  #[error("invalid request body: {source}")]
  InvalidBody {
    #[source]
    source: serde_json::Error,
  },

  #[error("validation failed: {source}")]
  Validation {
    #[from]
    source: ValidationError,
  },

  #[error("method not allowed, only {allowed} is supported")]
  MethodNotAllowed { allowed: &'static str },

  #[error("failed to bind {addr}: {source}")]
  Bind {
    addr: String,
    #[source]
    source: std::io::Error,
  },

  #[error("server failed: {source}")]
  Serve {
    #[source]
    source: std::io::Error,
  },

  #[error("in-flight requests did not finish within {timeout_secs} seconds of shutdown")]
  ShutdownTimeout { timeout_secs: u64 },
}

impl ServerError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::InvalidBody { .. } | Self::Validation { .. } => StatusCode::BAD_REQUEST,
      Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
      Self::Bind { .. } | Self::Serve { .. } | Self::ShutdownTimeout { .. } => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn to_body(&self) -> ErrorResponse {
    let (error, message) = match self {
      Self::InvalidBody { .. } => ("invalid request body", "failed to parse JSON payload".to_string()),
      Self::Validation { source } => ("validation failed", source.to_string()),
      Self::MethodNotAllowed { allowed } => (
        "method not allowed",
        format!("only {} method is supported", allowed),
      ),
      other => ("internal error", other.to_string()),
    };

    ErrorResponse {
      error: error.to_string(),
      message,
    }
  }
}

impl IntoResponse for ServerError {
  fn into_response(self) -> Response {
    (self.status(), Json(self.to_body())).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validation_message_is_passed_through() {
    let err = ServerError::from(ValidationError::EmptyPayloads);

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      err.to_body(),
      ErrorResponse {
        error: "validation failed".to_string(),
        message: "payloads array cannot be empty".to_string(),
      }
    );
  }

  #[test]
  fn test_method_not_allowed_body() {
    let err = ServerError::MethodNotAllowed { allowed: "GET" };

    assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(err.to_body().message, "only GET method is supported");
  }

  #[test]
  fn test_invalid_body_hides_parser_detail() {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let body = ServerError::InvalidBody { source }.to_body();

    assert_eq!(body.error, "invalid request body");
    assert_eq!(body.message, "failed to parse JSON payload");
  }
}
