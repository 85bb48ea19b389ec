use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{Method, header};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::RequestBodyTimeoutLayer;

use crate::handlers;
use crate::middleware::log_requests;
use crate::state::AppState;

/// Build the application router.
///
/// `read_timeout` bounds how long a client may take to send a request body.
pub fn create_router(state: Arc<AppState>, read_timeout: Duration) -> Router {
  Router::new()
    .route(
      "/v1/parallels/execute",
      post(handlers::execute).fallback(handlers::post_only),
    )
    .route("/health", get(handlers::health).fallback(handlers::get_only))
    .route("/", get(handlers::root).fallback(handlers::get_only))
    .layer(RequestBodyTimeoutLayer::new(read_timeout))
    .layer(cors_layer())
    .layer(middleware::from_fn(log_requests))
    .with_state(state)
}

fn cors_layer() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
