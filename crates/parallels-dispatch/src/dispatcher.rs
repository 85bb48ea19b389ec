//! Fan-out/fan-in over one batch.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use reqwest::Client;
use tokio::time::Instant;
use tracing::{error, info, instrument};

use crate::aggregate::{Aggregator, millis};
use crate::error::TaskError;
use crate::events::{ExecutionEvent, ExecutionNotifier};
use crate::executor::TaskExecutor;
use crate::request::{ExecutionRequest, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
use crate::result::{ExecutionResponse, TaskOutcome, TaskResult};
use crate::scope::DispatchScope;

/// Launches one unit per payload and joins on all of them.
///
/// There is no concurrency cap: a batch of n payloads runs n outbound calls
/// at once.
#[derive(Clone)]
pub struct Dispatcher {
  executor: TaskExecutor,
  notifier: Arc<dyn ExecutionNotifier>,
}

impl Dispatcher {
  /// Create a dispatcher. `client` is shared by every task of every batch.
  pub fn new(client: Client, notifier: Arc<dyn ExecutionNotifier>) -> Self {
    Self {
      executor: TaskExecutor::new(client),
      notifier,
    }
  }

  /// Execute a batch and return its results in input order.
  ///
  /// Does not return until every task has reported, even if `scope` is
  /// cancelled or its deadline passes first. Never fails: individual task
  /// errors are captured in the results.
  #[instrument(
    name = "dispatch",
    skip(self, request, scope),
    fields(webhook_url = %request.webhook_url, total_requests = request.payloads.len())
  )]
  pub async fn dispatch(
    &self,
    request: ExecutionRequest,
    scope: DispatchScope,
  ) -> ExecutionResponse {
    let started = Instant::now();
    let total = request.payloads.len();

    self.notifier.notify(ExecutionEvent::BatchStarted {
      webhook_url: request.webhook_url.clone(),
      total_requests: total,
      timeout_secs: request.timeout.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
    });

    let mut aggregator = Aggregator::new(total);

    let mut pending: FuturesUnordered<_> = request
      .into_tasks()
      .into_iter()
      .map(|task| {
        let index = task.index;
        let executor = self.executor.clone();
        let scope = scope.clone();
        let handle = tokio::spawn(async move { executor.execute(task, &scope).await });
        async move { (index, handle.await) }
      })
      .collect();

    info!(tasks = pending.len(), "tasks launched");

    while let Some((index, joined)) = pending.next().await {
      let result = joined.unwrap_or_else(|e| {
        error!(index, error = %e, "task unit terminated without reporting");
        TaskResult {
          index,
          outcome: TaskOutcome::Failure(TaskError::Aborted {
            message: e.to_string(),
          }),
          duration_ms: millis(started.elapsed()),
        }
      });

      if let Err(e) = aggregator.place(result) {
        error!(index, error = %e, "result could not be placed");
      }
    }

    let response = aggregator.finish(started.elapsed());

    self.notifier.notify(ExecutionEvent::BatchCompleted {
      summary: response.summary,
    });

    response
  }
}
