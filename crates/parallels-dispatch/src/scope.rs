//! Caller-supplied cancellation scope for a batch.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Bounds a whole batch: a cancellation token plus an optional absolute
/// deadline. Every task inherits it and races its own timeout against it.
#[derive(Debug, Clone)]
pub struct DispatchScope {
  cancel: CancellationToken,
  deadline: Option<Instant>,
}

impl DispatchScope {
  /// Create a scope with no deadline, cancelled through `cancel`.
  pub fn new(cancel: CancellationToken) -> Self {
    Self {
      cancel,
      deadline: None,
    }
  }

  /// Set an absolute deadline for the batch.
  pub fn with_deadline(mut self, deadline: Instant) -> Self {
    self.deadline = Some(deadline);
    self
  }

  /// Set the deadline relative to now.
  pub fn with_timeout(self, timeout: Duration) -> Self {
    self.with_deadline(Instant::now() + timeout)
  }

  pub fn cancel_token(&self) -> &CancellationToken {
    &self.cancel
  }

  pub fn deadline(&self) -> Option<Instant> {
    self.deadline
  }

  /// The earlier of `start + timeout` and the scope deadline.
  pub(crate) fn effective_deadline(&self, start: Instant, timeout: Duration) -> Instant {
    let own = start + timeout;
    match self.deadline {
      Some(deadline) if deadline < own => deadline,
      _ => own,
    }
  }
}

impl Default for DispatchScope {
  fn default() -> Self {
    Self::new(CancellationToken::new())
  }
}
