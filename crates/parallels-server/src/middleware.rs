//! Request logging.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::{Extensions, HeaderMap, header::USER_AGENT};
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::Instant;
use tracing::info;

/// Log one line per request once the response is ready.
pub async fn log_requests(request: Request, next: Next) -> Response {
  let started = Instant::now();
  let method = request.method().clone();
  let path = request.uri().path().to_string();
  let remote_addr = remote_addr(request.extensions());
  let user_agent = user_agent(request.headers()).to_string();

  let response = next.run(request).await;

  info!(
    method = %method,
    path = %path,
    status_code = response.status().as_u16(),
    duration_ms = started.elapsed().as_millis() as u64,
    remote_addr = %remote_addr,
    user_agent = %user_agent,
    "http request completed"
  );

  response
}

/// Peer address when the server was started with connect info, `-` otherwise.
pub(crate) fn remote_addr(extensions: &Extensions) -> String {
  extensions
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.to_string())
    .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn user_agent(headers: &HeaderMap) -> &str {
  headers
    .get(USER_AGENT)
    .and_then(|value| value.to_str().ok())
    .unwrap_or("")
}
