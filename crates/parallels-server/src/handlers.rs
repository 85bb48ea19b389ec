//! Route handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Extensions, HeaderMap, StatusCode, header::LOCATION};
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use parallels_dispatch::{DispatchScope, ExecutionRequest};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::ServerError;
use crate::middleware::{remote_addr, user_agent};
use crate::state::AppState;
use crate::validate::prepare;

/// `POST /v1/parallels/execute`
///
/// The batch scope is cancelled if this future is dropped before the
/// dispatch completes, which is how a client disconnect reaches in-flight
/// calls.
pub async fn execute(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  extensions: Extensions,
  body: Bytes,
) -> Result<Response, ServerError> {
  let request: ExecutionRequest = serde_json::from_slice(&body).map_err(|source| {
    error!(error = %source, "failed to decode request body");
    ServerError::InvalidBody { source }
  })?;

  let request = prepare(request, &state.dispatch).inspect_err(|e| {
    error!(error = %e, "request validation failed");
  })?;

  info!(
    webhook_url = %request.webhook_url,
    payloads_count = request.payloads.len(),
    timeout = request.timeout,
    has_auth = !request.auth_header.is_empty(),
    remote_addr = %remote_addr(&extensions),
    user_agent = %user_agent(&headers),
    "received parallel execution request"
  );

  let cancel = state.shutdown.child_token();
  let _disconnect = cancel.clone().drop_guard();
  let scope = DispatchScope::new(cancel)
    .with_timeout(Duration::from_secs(request.timeout) + state.dispatch.deadline_margin());

  let response = state.dispatcher.dispatch(request, scope).await;

  let status = if response.summary.successful_requests == 0 {
    StatusCode::MULTI_STATUS
  } else {
    StatusCode::OK
  };

  info!(
    total_requests = response.summary.total_requests,
    successful_requests = response.summary.successful_requests,
    failed_requests = response.summary.failed_requests,
    timeout_requests = response.summary.timeout_requests,
    duration_ms = response.summary.total_duration_ms,
    status_code = status.as_u16(),
    "completed parallel execution request"
  );

  Ok((status, Json(response)).into_response())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
  pub status: String,
  /// RFC 3339, UTC.
  pub timestamp: String,
  pub service: String,
  pub version: String,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
  Json(HealthResponse {
    status: "healthy".to_string(),
    timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    service: "parallels".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
  })
}

/// `GET /`
pub async fn root() -> impl IntoResponse {
  (StatusCode::FOUND, [(LOCATION, "/health")])
}

pub async fn post_only() -> ServerError {
  ServerError::MethodNotAllowed { allowed: "POST" }
}

pub async fn get_only() -> ServerError {
  ServerError::MethodNotAllowed { allowed: "GET" }
}
