//! Synchronizer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a cell-local failure (see `SyncError::is_cell_local`) does to the
/// rest of the run. Node and store failures always end the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellFailurePolicy {
    /// Log and count the failure, keep the previously stored row, continue.
    #[default]
    SkipCell,
    /// Fail the whole run.
    AbortRun,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Theme and statement indices are probed in `[0, max_scan_size)`.
    pub max_scan_size: u64,
    /// Interval between scheduled runs.
    pub period: Duration,
    /// Maximum number of contract probes in flight.
    pub cell_concurrency: usize,
    pub cell_failure_policy: CellFailurePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_scan_size: 16,
            period: Duration::from_secs(12 * 3600),
            cell_concurrency: 4,
            cell_failure_policy: CellFailurePolicy::SkipCell,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), SyncConfigError> {
        if self.period.is_zero() {
            return Err(SyncConfigError::ZeroPeriod);
        }
        if self.cell_concurrency == 0 {
            return Err(SyncConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncConfigError {
    #[error("sync period cannot be 0")]
    ZeroPeriod,
    #[error("cell_concurrency must be at least 1")]
    ZeroConcurrency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.max_scan_size, 16);
        assert_eq!(config.period, Duration::from_secs(43_200));
        assert_eq!(config.cell_failure_policy, CellFailurePolicy::SkipCell);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let config = SyncConfig {
            cell_concurrency: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SyncConfigError::ZeroConcurrency));
    }
}
