//! # Zarya Sync Runtime
//!
//! Entry point: logging, configuration, then `SyncRuntime` until Ctrl-C.

use anyhow::Result;
use tracing::{error, info};

use sync_runtime::{config, telemetry, SyncRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init(config::log_json(|key| std::env::var(key).ok()))?;

    let config = config::load_config();
    let runtime = SyncRuntime::build(config).await?;

    info!("Sync runtime is running. Press Ctrl+C to stop.");
    runtime
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
            }
        })
        .await
}
