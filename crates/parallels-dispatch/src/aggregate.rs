//! Order-preserving reassembly of task results.

use std::time::Duration;

use crate::error::{AggregateError, TaskError};
use crate::result::{ExecutionResponse, ExecutionSummary, TaskOutcome, TaskResult};

/// Fixed-size slot buffer. Each result is written to the slot of its own
/// index as it arrives, so completion order never leaks into output order.
#[derive(Debug)]
pub struct Aggregator {
  slots: Vec<Option<TaskResult>>,
  filled: usize,
}

impl Aggregator {
  /// Create a buffer for `expected` results.
  pub fn new(expected: usize) -> Self {
    let mut slots = Vec::with_capacity(expected);
    slots.resize_with(expected, || None);
    Self { slots, filled: 0 }
  }

  /// Number of results the batch expects.
  pub fn expected(&self) -> usize {
    self.slots.len()
  }

  /// Number of slots still waiting for a result.
  pub fn remaining(&self) -> usize {
    self.slots.len() - self.filled
  }

  /// Write a result into its slot.
  pub fn place(&mut self, result: TaskResult) -> Result<(), AggregateError> {
    let expected = self.slots.len();
    let slot = self
      .slots
      .get_mut(result.index)
      .ok_or(AggregateError::IndexOutOfRange {
        index: result.index,
        expected,
      })?;

    if slot.is_some() {
      return Err(AggregateError::DuplicateResult {
        index: result.index,
      });
    }

    *slot = Some(result);
    self.filled += 1;
    Ok(())
  }

  /// Produce the ordered response. `total_duration` is the batch wall clock.
  ///
  /// A slot that never received a result is reported as a failure so the
  /// response always covers every index.
  pub fn finish(self, total_duration: Duration) -> ExecutionResponse {
    let mut summary = ExecutionSummary {
      total_duration_ms: millis(total_duration),
      ..ExecutionSummary::default()
    };

    let results = self
      .slots
      .into_iter()
      .enumerate()
      .map(|(index, slot)| {
        let result = slot.unwrap_or(TaskResult {
          index,
          outcome: TaskOutcome::Failure(TaskError::Missing),
          duration_ms: 0,
        });
        summary.record(result.kind());
        result.into_webhook_result()
      })
      .collect();

    ExecutionResponse { results, summary }
  }
}

pub(crate) fn millis(duration: Duration) -> u64 {
  u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
