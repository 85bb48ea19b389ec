//! Task executor implementation.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::aggregate::millis;
use crate::error::{DispatchError, TaskError};
use crate::request::Task;
use crate::result::{TaskOutcome, TaskResult};
use crate::scope::DispatchScope;

/// Build the outbound client shared by every task in the process.
///
/// Redirects are not followed: a 3xx answer is reported as a failure like
/// any other non-2xx status.
pub fn build_client(user_agent: &str) -> Result<Client, DispatchError> {
  Client::builder()
    .user_agent(user_agent)
    .redirect(reqwest::redirect::Policy::none())
    .build()
    .map_err(|source| DispatchError::Client { source })
}

/// Performs the outbound call for one task.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TaskExecutor {
  client: Client,
}

impl TaskExecutor {
  /// Create a new task executor around a shared client.
  pub fn new(client: Client) -> Self {
    Self { client }
  }

  /// Execute a task. Always returns exactly one result.
  ///
  /// The call is bounded by the earlier of the task's own timeout and the
  /// scope deadline; elapsing that bound is a timeout. Cancelling the scope
  /// ends the call as a failure.
  #[instrument(
    name = "task_execute",
    skip(self, task, scope),
    fields(index = task.index, url = %task.webhook_url)
  )]
  pub async fn execute(&self, task: Task, scope: &DispatchScope) -> TaskResult {
    let started = Instant::now();
    let deadline =
      scope.effective_deadline(started, Duration::from_secs(task.timeout_secs));

    let outcome = tokio::select! {
      biased;
      _ = scope.cancel_token().cancelled() => Err(TaskError::Cancelled),
      call = tokio::time::timeout_at(deadline, self.call(&task)) => match call {
        Ok(result) => result,
        Err(_) => Err(TaskError::Timeout {
          timeout_secs: task.timeout_secs,
        }),
      },
    };

    let duration_ms = millis(started.elapsed());

    let outcome = match outcome {
      Ok((status, body)) => {
        debug!(status, duration_ms, "webhook request successful");
        TaskOutcome::Success { status, body }
      }
      Err(e) => {
        debug!(error = %e, duration_ms, "webhook request failed");
        TaskOutcome::Failure(e)
      }
    };

    TaskResult {
      index: task.index,
      outcome,
      duration_ms,
    }
  }

  /// Send the request and read the whole body.
  async fn call(&self, task: &Task) -> Result<(u16, Bytes), TaskError> {
    let payload = serde_json::to_vec(&task.payload).map_err(|e| TaskError::Serialization {
      message: e.to_string(),
    })?;

    debug!(payload_size = payload.len(), "executing webhook request");

    let mut request = self
      .client
      .post(&task.webhook_url)
      .header(CONTENT_TYPE, "application/json")
      .body(payload);
    if let Some(auth) = &task.auth_header {
      request = request.header(AUTHORIZATION, auth);
    }

    let response = request
      .send()
      .await
      .map_err(|source| TaskError::Transport { source })?;
    let status = response.status();
    let body = response
      .bytes()
      .await
      .map_err(|source| TaskError::ReadBody { source })?;

    if status.is_success() {
      Ok((status.as_u16(), body))
    } else {
      Err(TaskError::UpstreamStatus {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&body).into_owned(),
      })
    }
  }
}
