//! Completion tracking for the modes that wait on more than one signal.

use super::classify;
use crate::driver::DriverEvent;
use crate::error::SystemError;
use crate::results::ResultSet;

/// Two-flag gate for mutations: the statement must have completed and the
/// row count must have been observed before anything but a failure resolves.
/// A failure resolves immediately, whatever arrived before it.
#[derive(Debug)]
pub(crate) struct MutationGate {
    ignore_no_rows_affected: bool,
    completed: bool,
    row_count: Option<u64>,
}

impl MutationGate {
    pub(crate) fn new(ignore_no_rows_affected: bool) -> Self {
        Self {
            ignore_no_rows_affected,
            completed: false,
            row_count: None,
        }
    }

    /// Feed one event; returns the outcome once the call can resolve.
    pub(crate) fn observe(&mut self, event: DriverEvent) -> Option<Result<(), SystemError>> {
        match event {
            DriverEvent::Failed(err) => return Some(Err(classify::mutation_failure(&err))),
            DriverEvent::StatementDone { .. } => self.completed = true,
            DriverEvent::RowCount(count) => {
                self.row_count = Some(self.row_count.unwrap_or(0).saturating_add(count));
            }
        }

        match self.row_count {
            Some(count) if self.completed => Some(self.resolve(count)),
            _ => None,
        }
    }

    /// The driver closed the stream. Completion is implied; a missing row
    /// count means the response was malformed.
    pub(crate) fn finish(self) -> Result<(), SystemError> {
        match self.row_count {
            Some(count) => self.resolve(count),
            None => Err(classify::malformed("mutation finished without a row count")),
        }
    }

    fn resolve(&self, count: u64) -> Result<(), SystemError> {
        if count == 0 && !self.ignore_no_rows_affected {
            tracing::debug!("mutation affected no rows");
            return Err(SystemError::no_data());
        }
        Ok(())
    }
}

/// Counts statement completions of a batch and hands back the result of the
/// statement at position `expected` (1-based). Earlier results are ignored.
#[derive(Debug)]
pub(crate) struct StatementCounter {
    expected: usize,
    seen: usize,
}

impl StatementCounter {
    pub(crate) fn new(expected: usize) -> Self {
        Self { expected, seen: 0 }
    }

    pub(crate) fn observe(
        &mut self,
        event: DriverEvent,
    ) -> Option<Result<Option<ResultSet>, SystemError>> {
        match event {
            DriverEvent::Failed(err) => Some(Err(classify::query_failure(&err))),
            DriverEvent::StatementDone { rows } => {
                self.seen += 1;
                (self.seen == self.expected).then_some(Ok(rows))
            }
            DriverEvent::RowCount(_) => None,
        }
    }

    pub(crate) fn finish(&self) -> SystemError {
        tracing::debug!(seen = self.seen, expected = self.expected, "batch ended early");
        classify::malformed("batch ended before every statement completed")
    }
}
