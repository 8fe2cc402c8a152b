//! # Synchronizer Service
//!
//! One run mirrors the whole contract matrix into the store:
//!
//! 1. Probe every theme and statement slot in `[0, max_scan_size)` for both
//!    categorical flags; non-empty texts are upserted. Empty slots do not
//!    stop the scan.
//! 2. For every stored (theme, statement) pair with equal flags, read the
//!    cell info; skip cells with zero samples, otherwise read the full
//!    history, resolve the organ and upsert the cell.
//!
//! Every write is keyed by natural identity, so repeating a run over
//! unchanged chain state leaves the store unchanged.
//!
//! Cell-local failures follow `CellFailurePolicy`; an unreachable node or a
//! failing store write ends the run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use primitive_types::U256;
use tracing::{debug, error, info, warn};
use zs_01_contract_reader::ZaryaContract;
use zs_03_cell_store::{CategoricalCell, CellStore, NumericalCell, Statement, Theme};

use crate::domain::{
    convert_to_decimal, CellFailurePolicy, SyncConfig, SyncError, SyncOutcome, SyncReport,
};
use crate::organs::OrganResolver;
use crate::ports::OrganNames;

const FLAGS: [bool; 2] = [true, false];

/// Result of probing one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellSync {
    Numerical,
    Categorical,
    Empty,
}

/// Clears the running flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Synchronizer {
    contract: ZaryaContract,
    store: Arc<dyn CellStore>,
    organs: OrganResolver,
    config: SyncConfig,
    running: AtomicBool,
}

impl Synchronizer {
    pub fn new(
        contract: ZaryaContract,
        store: Arc<dyn CellStore>,
        names: Arc<dyn OrganNames>,
        config: SyncConfig,
    ) -> Self {
        Self {
            organs: OrganResolver::new(Arc::clone(&store), names),
            contract,
            store,
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Execute one full synchronization.
    ///
    /// Never panics on contract or store failures; they end the run as
    /// `SyncOutcome::Failed` and leave earlier data in place.
    pub async fn run_once(&self) -> SyncOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Synchronization already in progress, skipping trigger");
            return SyncOutcome::AlreadyRunning;
        }
        let _guard = RunGuard(&self.running);

        info!(max_scan_size = self.config.max_scan_size, "Synchronizing data from blockchain");
        let started = Instant::now();

        let result = self.run().await;
        let flushed = self.store.flush().map_err(SyncError::from);

        match result.and_then(|report| flushed.map(|_| report)) {
            Ok(mut report) => {
                report.elapsed = started.elapsed();
                if report.failed_cells > 0 {
                    warn!(
                        themes = report.themes,
                        statements = report.statements,
                        cells_written = report.cells_written(),
                        failed_cells = report.failed_cells,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "Synchronization completed with skipped cells"
                    );
                } else {
                    info!(
                        themes = report.themes,
                        statements = report.statements,
                        numerical_cells = report.numerical_cells,
                        categorical_cells = report.categorical_cells,
                        empty_cells = report.empty_cells,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "Synchronization completed successfully"
                    );
                }
                SyncOutcome::Completed(report)
            }
            Err(e) => {
                error!(error = %e, "Error during synchronization");
                SyncOutcome::Failed(e)
            }
        }
    }

    async fn run(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        info!("Syncing themes and statements");
        let (themes, statements) = self.sync_headers().await?;
        report.themes = themes;
        report.statements = statements;

        info!("Syncing cells");
        self.sync_cells(&mut report).await?;

        Ok(report)
    }

    // =========================================================================
    // Themes and statements
    // =========================================================================

    async fn sync_headers(&self) -> Result<(usize, usize), SyncError> {
        let slots: Vec<(bool, u64)> = FLAGS
            .iter()
            .flat_map(|&flag| (0..self.config.max_scan_size).map(move |i| (flag, i)))
            .collect();

        let themes = stream::iter(slots.clone())
            .map(|(flag, x)| self.sync_theme(flag, x))
            .buffer_unordered(self.config.cell_concurrency)
            .try_fold(0usize, |n, stored| async move { Ok::<_, SyncError>(n + stored as usize) })
            .await?;

        let statements = stream::iter(slots)
            .map(|(flag, y)| self.sync_statement(flag, y))
            .buffer_unordered(self.config.cell_concurrency)
            .try_fold(0usize, |n, stored| async move { Ok::<_, SyncError>(n + stored as usize) })
            .await?;

        Ok((themes, statements))
    }

    async fn sync_theme(&self, is_categorical: bool, x_index: u64) -> Result<bool, SyncError> {
        let text = self.contract.theme(is_categorical, x_index).await?;
        if text.is_empty() {
            return Ok(false);
        }
        self.store.upsert_theme(Theme {
            x_index,
            is_categorical,
            text,
        })?;
        Ok(true)
    }

    async fn sync_statement(&self, is_categorical: bool, y_index: u64) -> Result<bool, SyncError> {
        let text = self.contract.statement(is_categorical, y_index).await?;
        if text.is_empty() {
            return Ok(false);
        }
        self.store.upsert_statement(Statement {
            y_index,
            is_categorical,
            text,
        })?;
        Ok(true)
    }

    // =========================================================================
    // Cells
    // =========================================================================

    async fn sync_cells(&self, report: &mut SyncReport) -> Result<(), SyncError> {
        let themes = self.store.themes()?;
        let statements = self.store.statements()?;

        let pairs: Vec<(bool, u64, u64)> = themes
            .iter()
            .flat_map(|theme| {
                statements
                    .iter()
                    .filter(move |statement| statement.is_categorical == theme.is_categorical)
                    .map(move |statement| (theme.is_categorical, theme.x_index, statement.y_index))
            })
            .collect();

        let mut probes = stream::iter(pairs)
            .map(|(categorical, x, y)| async move {
                let result = if categorical {
                    self.sync_categorical_cell(x, y).await
                } else {
                    self.sync_numerical_cell(x, y).await
                };
                (x, y, result)
            })
            .buffer_unordered(self.config.cell_concurrency);

        while let Some((x, y, result)) = probes.next().await {
            match result {
                Ok(CellSync::Numerical) => report.numerical_cells += 1,
                Ok(CellSync::Categorical) => report.categorical_cells += 1,
                Ok(CellSync::Empty) => report.empty_cells += 1,
                Err(e)
                    if e.is_cell_local()
                        && self.config.cell_failure_policy == CellFailurePolicy::SkipCell =>
                {
                    warn!(x, y, error = %e, "Skipping cell, keeping previously stored data");
                    report.failed_cells += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    async fn sync_numerical_cell(&self, x: u64, y: u64) -> Result<CellSync, SyncError> {
        let info = self.contract.numerical_cell_info(x, y).await?;
        if info.sample_count.is_zero() {
            return Ok(CellSync::Empty);
        }
        check_sample_count(x, y, info.sample_count)?;

        let history = self
            .contract
            .numerical_history(x, y, U256::zero(), info.sample_count)
            .await?;
        let values: Vec<f64> = history
            .values
            .iter()
            .map(|raw| convert_to_decimal(*raw, info.decimals))
            .collect();

        let organ = self.organs.get_or_create_organ(&info.organ_hash)?;
        debug!(x, y, samples = values.len(), organ_id = %organ.id, "Fetched numerical cell");

        self.store.upsert_numerical_cell(NumericalCell {
            x_index: x,
            y_index: y,
            values,
            organ_id: organ.id,
        })?;
        Ok(CellSync::Numerical)
    }

    async fn sync_categorical_cell(&self, x: u64, y: u64) -> Result<CellSync, SyncError> {
        let info = self.contract.categorical_cell_info(x, y).await?;
        if info.sample_count.is_zero() {
            return Ok(CellSync::Empty);
        }
        check_sample_count(x, y, info.sample_count)?;

        let mut names = CategoryNames::new(&self.contract, x, y);

        let mut allowed_categories = Vec::with_capacity(info.allowed_category_ids.len());
        for id in &info.allowed_category_ids {
            allowed_categories.push(names.resolve(*id).await?);
        }

        let history = self
            .contract
            .categorical_history(x, y, U256::zero(), info.sample_count)
            .await?;
        let mut categories = Vec::with_capacity(history.values.len());
        for id in &history.values {
            categories.push(names.resolve(*id).await?);
        }

        let organ = self.organs.get_or_create_organ(&info.organ_hash)?;
        debug!(x, y, categories = ?categories, organ_id = %organ.id, "Fetched categorical cell");

        self.store.upsert_categorical_cell(CategoricalCell {
            x_index: x,
            y_index: y,
            categories,
            allowed_categories,
            organ_id: organ.id,
        })?;
        Ok(CellSync::Categorical)
    }
}

/// Histories are returned in one call; the count must be addressable.
fn check_sample_count(x: u64, y: u64, count: U256) -> Result<(), SyncError> {
    if count > U256::from(u32::MAX) {
        return Err(SyncError::SampleCount {
            x,
            y,
            count: count.to_string(),
        });
    }
    Ok(())
}

/// Per-cell memo of `getCategoryName` lookups.
struct CategoryNames<'a> {
    contract: &'a ZaryaContract,
    x: u64,
    y: u64,
    known: HashMap<u64, String>,
}

impl<'a> CategoryNames<'a> {
    fn new(contract: &'a ZaryaContract, x: u64, y: u64) -> Self {
        Self {
            contract,
            x,
            y,
            known: HashMap::new(),
        }
    }

    async fn resolve(&mut self, category_id: u64) -> Result<String, SyncError> {
        if let Some(name) = self.known.get(&category_id) {
            return Ok(name.clone());
        }
        let name = self
            .contract
            .category_name(self.x, self.y, category_id)
            .await
            .map_err(|source| SyncError::Category {
                x: self.x,
                y: self.y,
                category_id,
                source,
            })?;
        self.known.insert(category_id, name.clone());
        Ok(name)
    }
}
