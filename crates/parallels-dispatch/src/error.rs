//! Dispatch error types.

/// Errors that end a single task. Captured into that task's result and never
/// propagated past the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
  /// The payload could not be encoded as JSON.
  #[error("failed to marshal payload: {message}")]
  Serialization { message: String },

  /// Connect, DNS, TLS, reset or any other failure sending the request.
  #[error("request failed: {source}")]
  Transport {
    #[source]
    source: reqwest::Error,
  },

  /// The upstream answered but the body could not be read.
  #[error("failed to read response body: {source}")]
  ReadBody {
    #[source]
    source: reqwest::Error,
  },

  /// The effective deadline elapsed before the call resolved.
  #[error("request timeout after {timeout_secs} seconds")]
  Timeout { timeout_secs: u64 },

  /// The caller's scope was cancelled while the call was in flight.
  #[error("request cancelled")]
  Cancelled,

  /// The upstream answered with a status outside 200..300.
  #[error("webhook returned status {status}: {body}")]
  UpstreamStatus { status: u16, body: String },

  /// The unit running the task terminated without reporting.
  #[error("task aborted: {message}")]
  Aborted { message: String },

  /// No result was ever placed for this index.
  #[error("no result reported")]
  Missing,
}

impl TaskError {
  /// Whether this error means the deadline elapsed.
  pub fn is_timeout(&self) -> bool {
    matches!(self, Self::Timeout { .. })
  }
}

/// Invariant violations while reassembling results. These indicate a bug in
/// the dispatcher, not a runtime condition.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
  #[error("result index {index} out of range for batch of {expected}")]
  IndexOutOfRange { index: usize, expected: usize },

  #[error("duplicate result for index {index}")]
  DuplicateResult { index: usize },
}

/// Errors setting up the dispatcher itself.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
  /// Failed to build the shared outbound HTTP client.
  #[error("failed to build http client: {source}")]
  Client {
    #[source]
    source: reqwest::Error,
  },
}
