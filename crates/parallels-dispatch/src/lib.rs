//! Parallels Dispatch
//!
//! This crate is the core of parallels: it takes one target endpoint and an
//! ordered list of JSON payloads, POSTs every payload concurrently, and
//! returns results in input order together with summary counters.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Dispatcher                           │
//! │  - dispatch(request, scope) → ExecutionResponse             │
//! │  - one tokio task per payload, joined on all n reports      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TaskExecutor                          │
//! │  - one POST per task, deadline + cancellation, classify     │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Aggregator                           │
//! │  - slot per index, summary counters                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use parallels_dispatch::{DispatchScope, Dispatcher, TracingNotifier, build_client};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = build_client("parallels/0.1")?;
//! let dispatcher = Dispatcher::new(client, Arc::new(TracingNotifier));
//!
//! let scope = DispatchScope::new(CancellationToken::new()).with_timeout(Duration::from_secs(65));
//! let response = dispatcher.dispatch(request, scope).await;
//! ```

mod aggregate;
mod dispatcher;
mod error;
mod events;
mod executor;
mod request;
mod result;
mod scope;

pub use aggregate::Aggregator;
pub use dispatcher::Dispatcher;
pub use error::{AggregateError, DispatchError, TaskError};
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier, TracingNotifier};
pub use executor::{TaskExecutor, build_client};
pub use request::{
  DEFAULT_TIMEOUT_SECS, ExecutionRequest, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS, Task,
};
pub use result::{
  ExecutionResponse, ExecutionSummary, OutcomeKind, TaskOutcome, TaskResult, WebhookResult,
};
pub use scope::DispatchScope;
