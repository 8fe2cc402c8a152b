//! # Zarya Sync Runtime
//!
//! Wires the subsystems into one process:
//!
//! ```text
//!                    ┌──────────── every period ────────────┐
//!                    ↓                                      │
//!  ContractReader(1) ──→ Synchronizer(4) ──→ CellStore(3)   │
//!                              │                            │
//!                              └──→ OrganDecoder(2)         │
//!                                                           │
//!  client ──→ RpcProxy(5) ──→ node          scheduler ──────┘
//!                 │
//!                 └──GET /data──→ CellStore(3)
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then environment)
//! 2. Build the organ reverse index (blocking pool)
//! 3. Open the store and the contract reader
//! 4. Start the scheduler (first run immediately) and the proxy
//! 5. On shutdown: stop the proxy, abort an in-flight run, flush the store

pub mod config;
pub mod telemetry;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};
use zs_01_contract_reader::{ContractReadService, ZaryaContract};
use zs_02_organ_decoder::OrganDecoder;
use zs_03_cell_store::{open_store, CellStore};
use zs_04_synchronizer::{spawn_periodic, Synchronizer};
use zs_05_rpc_proxy::RpcProxy;

pub use config::{load_config, load_config_from, log_json, RuntimeConfig};

/// The assembled sync engine.
pub struct SyncRuntime {
    config: RuntimeConfig,
    store: Arc<dyn CellStore>,
    synchronizer: Arc<Synchronizer>,
    proxy: RpcProxy,
}

impl SyncRuntime {
    /// Build every subsystem from `config`.
    pub async fn build(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;

        let decoder_config = config.decoder.clone();
        let decoder = tokio::task::spawn_blocking(move || OrganDecoder::build(&decoder_config))
            .await
            .context("organ decoder task failed")?
            .context("failed to build organ decoder")?;

        let store = open_store(&config.store).context("failed to open cell store")?;
        let counts = store.counts().context("failed to read cell store")?;
        info!(
            themes = counts.themes,
            statements = counts.statements,
            organs = counts.organs,
            numerical_cells = counts.numerical_cells,
            categorical_cells = counts.categorical_cells,
            "Cell store opened"
        );

        let reader = ContractReadService::from_config(&config.contract)
            .context("failed to create contract reader")?;
        info!(contract = ?reader.contract_address(), "Contract reader ready");

        let synchronizer = Arc::new(Synchronizer::new(
            ZaryaContract::new(Arc::new(reader)),
            Arc::clone(&store),
            Arc::new(decoder),
            config.sync.clone(),
        ));

        let proxy = RpcProxy::from_config(config.proxy.clone())
            .context("failed to create RPC proxy")?
            .with_cells(Arc::clone(&store));

        Ok(Self {
            config,
            store,
            synchronizer,
            proxy,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn CellStore> {
        Arc::clone(&self.store)
    }

    pub fn synchronizer(&self) -> Arc<Synchronizer> {
        Arc::clone(&self.synchronizer)
    }

    /// Run until `shutdown` resolves or the proxy stops on its own.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("===========================================");
        info!("  Zarya Sync Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let scheduler = spawn_periodic(
            Arc::clone(&self.synchronizer),
            self.config.sync.period,
            shutdown_rx.clone(),
        );

        let mut proxy_rx = shutdown_rx;
        let proxy_shutdown = async move {
            while !*proxy_rx.borrow() {
                if proxy_rx.changed().await.is_err() {
                    break;
                }
            }
        };
        let mut proxy = tokio::spawn(self.proxy.run(proxy_shutdown));

        let early_exit = tokio::select! {
            joined = &mut proxy => Some(joined),
            _ = shutdown => None,
        };
        match early_exit {
            Some(_) => warn!("RPC proxy exited, shutting down"),
            None => info!("Shutdown signal received"),
        }

        let _ = shutdown_tx.send(true);
        let proxy_result = match early_exit {
            Some(joined) => joined,
            None => proxy.await,
        };
        if let Err(e) = scheduler.await {
            warn!(error = %e, "Sync scheduler task failed");
        }

        self.store.flush().context("failed to flush cell store")?;
        proxy_result
            .context("RPC proxy task failed")?
            .context("RPC proxy server failed")?;

        info!("Zarya sync runtime stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use zs_03_cell_store::StoreConfig;

    fn local_config() -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.decoder.scan_organ_size = 2;
        config.contract.rpc_url = "http://127.0.0.1:1".into();
        config.contract.request_timeout = Duration::from_secs(1);
        config.proxy.bind_addr = "127.0.0.1:0".parse().unwrap();
        config
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let mut config = local_config();
        config.contract.contract_address = "0x12".into();
        assert!(SyncRuntime::build(config).await.is_err());
    }

    #[tokio::test]
    async fn test_proxy_serves_store_contents() {
        use axum::body::{to_bytes, Body};
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let runtime = SyncRuntime::build(local_config()).await.unwrap();
        let response = runtime
            .proxy
            .router()
            .oneshot(Request::builder().uri("/data").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = local_config();
        config.store = StoreConfig::persistent(dir.path().join("cells.db"));

        let runtime = SyncRuntime::build(config).await.unwrap();
        let store = runtime.store();
        runtime
            .run(tokio::time::sleep(Duration::from_millis(50)))
            .await
            .unwrap();

        // the first run cannot reach the node, so nothing was mirrored
        assert_eq!(store.counts().unwrap().themes, 0);
    }
}
