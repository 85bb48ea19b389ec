//! Request and task types.

use serde::{Deserialize, Serialize};

/// Smallest per-call timeout accepted, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Largest per-call timeout accepted, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 3600;
/// Timeout applied when a request leaves it unset or zero.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// A batch of payloads to deliver to one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
  /// Absolute URL every payload is POSTed to.
  #[serde(default)]
  pub webhook_url: String,
  /// Sent verbatim as the `Authorization` header. Empty means absent.
  #[serde(default)]
  pub auth_header: String,
  /// Payloads in the order results must be returned.
  #[serde(default)]
  pub payloads: Vec<serde_json::Map<String, serde_json::Value>>,
  /// Per-call timeout in seconds.
  #[serde(default)]
  pub timeout: u64,
}

impl ExecutionRequest {
  /// Split the request into one task per payload, indexed by position.
  pub fn into_tasks(self) -> Vec<Task> {
    let auth_header = Some(self.auth_header).filter(|auth| !auth.is_empty());
    let timeout_secs = self.timeout.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);

    self
      .payloads
      .into_iter()
      .enumerate()
      .map(|(index, payload)| Task {
        index,
        webhook_url: self.webhook_url.clone(),
        auth_header: auth_header.clone(),
        payload,
        timeout_secs,
      })
      .collect()
  }
}

/// One outbound call: one payload sent to the batch's endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
  /// Position of the payload in the request.
  pub index: usize,
  pub webhook_url: String,
  pub auth_header: Option<String>,
  pub payload: serde_json::Map<String, serde_json::Value>,
  pub timeout_secs: u64,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn request(payloads: Vec<serde_json::Value>, auth: &str, timeout: u64) -> ExecutionRequest {
    ExecutionRequest {
      webhook_url: "http://localhost/hook".to_string(),
      auth_header: auth.to_string(),
      payloads: payloads
        .into_iter()
        .map(|p| p.as_object().cloned().unwrap())
        .collect(),
      timeout,
    }
  }

  #[test]
  fn test_into_tasks_indexes_by_position() {
    let tasks = request(vec![json!({"n": 0}), json!({"n": 1}), json!({"n": 2})], "", 10).into_tasks();

    assert_eq!(tasks.len(), 3);
    for (i, task) in tasks.iter().enumerate() {
      assert_eq!(task.index, i);
      assert_eq!(task.payload["n"], i);
      assert_eq!(task.webhook_url, "http://localhost/hook");
      assert_eq!(task.timeout_secs, 10);
    }
  }

  #[test]
  fn test_empty_auth_becomes_none() {
    let tasks = request(vec![json!({})], "", 10).into_tasks();
    assert_eq!(tasks[0].auth_header, None);

    let tasks = request(vec![json!({})], "Bearer abc", 10).into_tasks();
    assert_eq!(tasks[0].auth_header.as_deref(), Some("Bearer abc"));
  }

  #[test]
  fn test_timeout_is_clamped() {
    assert_eq!(request(vec![json!({})], "", 0).into_tasks()[0].timeout_secs, 1);
    assert_eq!(request(vec![json!({})], "", 9000).into_tasks()[0].timeout_secs, 3600);
  }

  #[test]
  fn test_empty_request_has_no_tasks() {
    assert!(request(vec![], "", 10).into_tasks().is_empty());
  }

  #[test]
  fn test_deserialize_defaults() {
    let parsed: ExecutionRequest =
      serde_json::from_value(json!({"webhook_url": "http://x/y"})).unwrap();

    assert_eq!(parsed.auth_header, "");
    assert!(parsed.payloads.is_empty());
    assert_eq!(parsed.timeout, 0);
  }
}
