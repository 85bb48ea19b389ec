//! Batch events and notifiers for observability.
//!
//! The dispatcher reports the start and end of every batch to an injected
//! [`ExecutionNotifier`]. What happens to the events (logging, metrics,
//! streaming to a UI) is up to the implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::result::ExecutionSummary;

/// Events emitted while dispatching a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// Tasks are about to be launched.
  BatchStarted {
    webhook_url: String,
    total_requests: usize,
    timeout_secs: u64,
  },

  /// Every task has reported and the response is assembled.
  BatchCompleted { summary: ExecutionSummary },
}

/// Trait for receiving batch events.
pub trait ExecutionNotifier: Send + Sync {
  /// Called when an execution event occurs.
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  /// Create a new channel notifier.
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}

/// A notifier that writes each event as a structured `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl ExecutionNotifier for TracingNotifier {
  fn notify(&self, event: ExecutionEvent) {
    match event {
      ExecutionEvent::BatchStarted {
        webhook_url,
        total_requests,
        timeout_secs,
      } => {
        info!(
          webhook_url = %webhook_url,
          total_requests,
          timeout_seconds = timeout_secs,
          "batch_started"
        );
      }
      ExecutionEvent::BatchCompleted { summary } => {
        info!(
          total_requests = summary.total_requests,
          successful = summary.successful_requests,
          failed = summary.failed_requests,
          timeout = summary.timeout_requests,
          duration_ms = summary.total_duration_ms,
          "batch_completed"
        );
      }
    }
  }
}
