//! Parallels Server
//!
//! The HTTP boundary in front of [`parallels_dispatch::Dispatcher`]:
//!
//! | Method | Path                    | Result                                 |
//! |--------|-------------------------|----------------------------------------|
//! | POST   | `/v1/parallels/execute` | 200, or 207 when no call succeeded     |
//! | GET    | `/health`               | 200 with service status                |
//! | GET    | `/`                     | 302 to `/health`                       |
//!
//! Requests are validated and defaulted by [`prepare`] before dispatch. Each
//! batch runs under a scope derived from the server's shutdown token, so a
//! client disconnect or an expired shutdown grace period cancels it.

mod error;
mod handlers;
mod middleware;
mod router;
mod serve;
mod state;
mod validate;

pub use error::{ErrorResponse, ServerError};
pub use handlers::HealthResponse;
pub use router::create_router;
pub use serve::{bind, serve, shutdown_signal};
pub use state::AppState;
pub use validate::{ValidationError, prepare};
