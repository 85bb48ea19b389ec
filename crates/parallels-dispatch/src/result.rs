//! Task and batch result types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::TaskError;

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
  Success,
  Failure,
  Timeout,
}

/// Terminal state of one task.
#[derive(Debug)]
pub enum TaskOutcome {
  /// The upstream answered 2xx. The body is kept verbatim.
  Success { status: u16, body: Bytes },
  /// Anything else, including an elapsed deadline.
  Failure(TaskError),
}

impl TaskOutcome {
  pub fn kind(&self) -> OutcomeKind {
    match self {
      Self::Success { .. } => OutcomeKind::Success,
      Self::Failure(e) if e.is_timeout() => OutcomeKind::Timeout,
      Self::Failure(_) => OutcomeKind::Failure,
    }
  }
}

/// Result of a single task, produced exactly once per task.
#[derive(Debug)]
pub struct TaskResult {
  /// Index of the task in the request.
  pub index: usize,
  pub outcome: TaskOutcome,
  /// Wall clock from task start to outcome, in milliseconds.
  pub duration_ms: u64,
}

impl TaskResult {
  pub fn kind(&self) -> OutcomeKind {
    self.outcome.kind()
  }

  /// Render the result for the response body.
  pub fn into_webhook_result(self) -> WebhookResult {
    let (success, response, error) = match self.outcome {
      TaskOutcome::Success { body, .. } => (true, Some(raw_body(&body)), None),
      TaskOutcome::Failure(e) if e.is_timeout() => (false, None, Some("timeout".to_string())),
      TaskOutcome::Failure(e) => (false, None, Some(e.to_string())),
    };

    WebhookResult {
      index: self.index,
      success,
      response,
      error,
      duration_ms: self.duration_ms,
    }
  }
}

/// Embed an upstream body in the response: as-is when it is JSON, as a JSON
/// string when it is not, `null` when empty.
fn raw_body(body: &[u8]) -> Box<RawValue> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return null_raw();
  }
  if let Ok(raw) = serde_json::from_slice::<Box<RawValue>>(body) {
    return raw;
  }
  serde_json::value::to_raw_value(&String::from_utf8_lossy(body)).unwrap_or_else(|_| null_raw())
}

fn null_raw() -> Box<RawValue> {
  RawValue::NULL.to_owned()
}

/// Wire form of one task's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResult {
  pub index: usize,
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub response: Option<Box<RawValue>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub duration_ms: u64,
}

/// Counters over a whole batch.
///
/// `timeout_requests` is a subset of `failed_requests`: a timed-out task is
/// counted in both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
  pub total_requests: usize,
  pub successful_requests: usize,
  pub failed_requests: usize,
  pub timeout_requests: usize,
  /// Wall clock of the whole batch, not a sum of task durations.
  pub total_duration_ms: u64,
}

impl ExecutionSummary {
  pub(crate) fn record(&mut self, kind: OutcomeKind) {
    self.total_requests += 1;
    match kind {
      OutcomeKind::Success => self.successful_requests += 1,
      OutcomeKind::Failure => self.failed_requests += 1,
      OutcomeKind::Timeout => {
        self.failed_requests += 1;
        self.timeout_requests += 1;
      }
    }
  }
}

/// Ordered results of a batch. `results[i].index == i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResponse {
  pub results: Vec<WebhookResult>,
  pub summary: ExecutionSummary,
}

impl ExecutionResponse {
  /// An empty batch: no results, every counter zero.
  pub fn empty() -> Self {
    Self {
      results: Vec::new(),
      summary: ExecutionSummary::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn success(body: &'static [u8]) -> TaskResult {
    TaskResult {
      index: 0,
      outcome: TaskOutcome::Success {
        status: 200,
        body: Bytes::from_static(body),
      },
      duration_ms: 3,
    }
  }

  #[test]
  fn test_json_body_is_embedded_verbatim() {
    let result = success(br#"{"ok":true,"n":[1,2]}"#).into_webhook_result();

    assert!(result.success);
    assert_eq!(result.response.unwrap().get(), r#"{"ok":true,"n":[1,2]}"#);
    assert!(result.error.is_none());
  }

  #[test]
  fn test_text_body_becomes_json_string() {
    let result = success(b"accepted").into_webhook_result();
    assert_eq!(result.response.unwrap().get(), r#""accepted""#);
  }

  #[test]
  fn test_empty_body_becomes_null() {
    let result = success(b"").into_webhook_result();
    assert_eq!(result.response.unwrap().get(), "null");
  }

  #[test]
  fn test_timeout_renders_as_timeout() {
    let result = TaskResult {
      index: 4,
      outcome: TaskOutcome::Failure(TaskError::Timeout { timeout_secs: 1 }),
      duration_ms: 1000,
    };
    assert_eq!(result.kind(), OutcomeKind::Timeout);

    let rendered = result.into_webhook_result();
    assert_eq!(rendered.index, 4);
    assert!(!rendered.success);
    assert!(rendered.response.is_none());
    assert_eq!(rendered.error.as_deref(), Some("timeout"));
  }

  #[test]
  fn test_status_failure_keeps_code_and_body() {
    let result = TaskResult {
      index: 0,
      outcome: TaskOutcome::Failure(TaskError::UpstreamStatus {
        status: 404,
        body: "not here".to_string(),
      }),
      duration_ms: 2,
    };
    assert_eq!(result.kind(), OutcomeKind::Failure);

    let error = result.into_webhook_result().error.unwrap();
    assert_eq!(error, "webhook returned status 404: not here");
  }

  #[test]
  fn test_summary_counts_timeouts_as_failures() {
    let mut summary = ExecutionSummary::default();
    summary.record(OutcomeKind::Success);
    summary.record(OutcomeKind::Failure);
    summary.record(OutcomeKind::Timeout);

    assert_eq!(summary.total_requests, 3);
    assert_eq!(summary.successful_requests, 1);
    assert_eq!(summary.failed_requests, 2);
    assert_eq!(summary.timeout_requests, 1);
  }

  #[test]
  fn test_wire_format_omits_absent_fields() {
    let rendered = serde_json::to_value(success(b"{}").into_webhook_result()).unwrap();

    assert_eq!(rendered["index"], 0);
    assert_eq!(rendered["success"], true);
    assert_eq!(rendered["response"], serde_json::json!({}));
    assert_eq!(rendered["duration_ms"], 3);
    assert!(rendered.get("error").is_none());
  }
}
