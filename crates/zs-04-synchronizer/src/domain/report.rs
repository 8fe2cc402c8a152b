//! Run results.

use std::time::Duration;

use serde::Serialize;

use super::errors::SyncError;

/// Counters for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub themes: usize,
    pub statements: usize,
    pub numerical_cells: usize,
    pub categorical_cells: usize,
    /// Pairs whose on-chain sample count was zero.
    pub empty_cells: usize,
    /// Cells skipped under `CellFailurePolicy::SkipCell`.
    pub failed_cells: usize,
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn cells_written(&self) -> usize {
        self.numerical_cells + self.categorical_cells
    }
}

#[derive(Debug)]
pub enum SyncOutcome {
    Completed(SyncReport),
    Failed(SyncError),
    /// Another run was active; nothing was done.
    AlreadyRunning,
}

impl SyncOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SyncOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            SyncOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}
