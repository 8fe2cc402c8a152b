//! Periodic trigger for `Synchronizer::run_once`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::service::Synchronizer;

/// Run `sync` now and then every `period` until `shutdown` flips to `true`
/// or its sender is dropped.
///
/// Each run executes on its own task so a panic inside one run does not stop
/// the schedule. A run still in flight at shutdown is aborted.
pub fn spawn_periodic(
    sync: Arc<Synchronizer>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = period.as_secs(), "Sync scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let worker = Arc::clone(&sync);
            let mut run = tokio::spawn(async move { worker.run_once().await });

            let stop = loop {
                tokio::select! {
                    joined = &mut run => {
                        if let Err(e) = joined {
                            error!(error = %e, "Sync run panicked");
                        }
                        break false;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            run.abort();
                            break true;
                        }
                    }
                }
            };
            if stop {
                break;
            }
        }

        info!("Sync scheduler stopped");
    })
}
