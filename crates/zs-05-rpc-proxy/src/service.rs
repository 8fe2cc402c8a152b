//! # RPC Proxy Service
//!
//! HTTP front for the node:
//!
//! - `POST /auth/rpc` forwards a JSON-RPC request object upstream and relays
//!   the node's status and body. Rate-limited per client.
//! - `GET /data` every mirrored cell as a data point, when a cell store is
//!   attached. Not rate-limited.
//! - `GET /health` liveness probe.
//! - `GET /status` service status.
//!
//! Upstream failures answer `502` with a JSON-RPC internal error; bodies that
//! are not a JSON object answer `400` without reaching the node.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use zs_03_cell_store::{data_points, CellStore};

use crate::adapters::HttpUpstream;
use crate::domain::{ApiError, ProxyConfig, ProxyError};
use crate::middleware::{reset_task, RateLimitLayer, RateLimitState};
use crate::ports::Upstream;

/// Shared handler state.
#[derive(Clone)]
pub struct ProxyState {
    pub upstream: Arc<dyn Upstream>,
    pub cells: Option<Arc<dyn CellStore>>,
}

pub struct RpcProxy {
    config: ProxyConfig,
    state: ProxyState,
    limiter: RateLimitLayer,
}

impl RpcProxy {
    pub fn new(config: ProxyConfig, upstream: Arc<dyn Upstream>) -> Self {
        let limiter = RateLimitLayer::new(config.rate_limit.clone());
        Self {
            config,
            state: ProxyState {
                upstream,
                cells: None,
            },
            limiter,
        }
    }

    /// Proxy forwarding to `config.upstream_url` over HTTP.
    pub fn from_config(config: ProxyConfig) -> Result<Self, ProxyError> {
        let upstream = Arc::new(HttpUpstream::new(&config)?);
        Ok(Self::new(config, upstream))
    }

    /// Serve the cells of `store` on `GET /data`.
    pub fn with_cells(mut self, store: Arc<dyn CellStore>) -> Self {
        self.state.cells = Some(store);
        self
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn rate_limit_state(&self) -> Arc<RateLimitState> {
        self.limiter.state()
    }

    pub fn router(&self) -> Router {
        router(self.state.clone(), self.limiter.clone())
    }

    /// Bind, serve until `shutdown` resolves, and run the window reset
    /// alongside.
    pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            addr = %listener.local_addr()?,
            upstream = %self.config.upstream_url,
            "RPC proxy listening"
        );

        let reset = tokio::spawn(reset_task(
            self.limiter.state(),
            self.config.rate_limit.window,
        ));
        let result = serve(listener, self.router(), shutdown).await;
        reset.abort();

        info!("RPC proxy stopped");
        result
    }
}

/// Routes with the rate limit applied to `/auth/rpc` only.
pub fn router(state: ProxyState, limiter: RateLimitLayer) -> Router {
    Router::new()
        .route("/auth/rpc", post(proxy_rpc))
        .route_layer(limiter)
        .route("/data", get(list_data))
        .route("/health", get(health_check))
        .route("/status", get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` with peer addresses available to the rate limiter.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

async fn proxy_rpc(State(state): State<ProxyState>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return bad_request(ApiError::invalid_request("expected a JSON object")),
        Err(e) => return bad_request(ApiError::from(e)),
    };

    match state.upstream.forward(&request).await {
        Ok(reply) => {
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(reply.body)).into_response()
        }
        Err(e) => {
            error!(error = %e, method = ?request.get("method"), "Error proxying RPC request");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": ApiError::from(&e) })),
            )
                .into_response()
        }
    }
}

fn bad_request(error: ApiError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "jsonrpc": "2.0",
            "error": error,
            "id": null
        })),
    )
        .into_response()
}

async fn list_data(State(state): State<ProxyState>) -> Response {
    let Some(cells) = state.cells else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no cell store attached" })),
        )
            .into_response();
    };

    match data_points(cells.as_ref()) {
        Ok(points) => Json(points).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read data points");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "zarya-rpc-proxy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn status() -> impl IntoResponse {
    Json(json!({ "status": "Enabled" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RateLimitConfig;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Map;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    use crate::ports::UpstreamReply;
    use primitive_types::H256;
    use zs_03_cell_store::{InMemoryCellStore, NumericalCell, Organ, Statement, Theme};

    /// Answers every call with `result = "0x10"`, echoing the id.
    #[derive(Default)]
    struct EchoNode {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Upstream for EchoNode {
        async fn forward(&self, request: &Map<String, Value>) -> Result<UpstreamReply, ProxyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(UpstreamReply {
                status: 200,
                body: json!({"jsonrpc": "2.0", "result": "0x10", "id": request.get("id")}),
            })
        }
    }

    struct DownNode;

    #[async_trait]
    impl Upstream for DownNode {
        async fn forward(&self, _: &Map<String, Value>) -> Result<UpstreamReply, ProxyError> {
            Err(ProxyError::Transport("connection refused".into()))
        }
    }

    fn app(upstream: Arc<dyn Upstream>) -> Router {
        RpcProxy::new(ProxyConfig::default(), upstream).router()
    }

    fn rpc(body: &str, client: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/auth/rpc")
            .header("content-type", "application/json")
            .header("x-forwarded-for", client)
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const BLOCK_NUMBER: &str = r#"{"jsonrpc":"2.0","method":"eth_blockNumber","params":[],"id":1}"#;

    #[tokio::test]
    async fn test_request_is_relayed() {
        let node = Arc::new(EchoNode::default());
        let app = app(node.clone());

        let (status, body) = send(&app, rpc(BLOCK_NUMBER, "203.0.113.7")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"jsonrpc": "2.0", "result": "0x10", "id": 1}));
        assert_eq!(node.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected_before_upstream() {
        let node = Arc::new(EchoNode::default());
        let app = app(node.clone());

        let (status, body) = send(&app, rpc("{not json", "c")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["id"], Value::Null);

        let (status, body) = send(&app, rpc("[1, 2]", "c")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], -32600);

        assert_eq!(node.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (status, body) = send(&app(Arc::new(DownNode)), rpc(BLOCK_NUMBER, "c")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body,
            json!({"error": {"code": -32603, "message": "Internal error: connection refused"}})
        );
    }

    #[tokio::test]
    async fn test_hundred_and_first_request_is_rejected() {
        let app = app(Arc::new(EchoNode::default()));

        for _ in 0..100 {
            let (status, _) = send(&app, rpc(BLOCK_NUMBER, "203.0.113.7")).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, rpc(BLOCK_NUMBER, "203.0.113.7")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body,
            json!({"error": "Zarya Data: Rate limit exceeded. Maximum 100 requests per minute allowed."})
        );

        // another client is unaffected
        let (status, _) = send(&app, rpc(BLOCK_NUMBER, "198.51.100.2, 203.0.113.7")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_and_status_are_not_rate_limited() {
        let config = ProxyConfig {
            rate_limit: RateLimitConfig {
                max_requests_per_window: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let app = RpcProxy::new(config, Arc::new(EchoNode::default())).router();

        for _ in 0..3 {
            let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "healthy");
        }

        let req = Request::builder().uri("/status").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "Enabled"}));
    }

    fn stored_cell() -> Arc<dyn CellStore> {
        let store = InMemoryCellStore::default();
        store
            .upsert_theme(Theme {
                x_index: 0,
                is_categorical: false,
                text: "Economy".into(),
            })
            .unwrap();
        store
            .upsert_statement(Statement {
                y_index: 1,
                is_categorical: false,
                text: "GDP growth".into(),
            })
            .unwrap();
        let organ = store
            .insert_organ_if_absent(Organ::new(H256::repeat_byte(7), "77.0.СОВ"))
            .unwrap();
        store
            .upsert_numerical_cell(NumericalCell {
                x_index: 0,
                y_index: 1,
                values: vec![1.5, 2.0],
                organ_id: organ.id,
            })
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_data_lists_stored_cells() {
        let app = RpcProxy::new(ProxyConfig::default(), Arc::new(EchoNode::default()))
            .with_cells(stored_cell())
            .router();

        let req = Request::builder().uri("/data").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "x_index": 0,
                "y_index": 1,
                "theme": "Economy",
                "statement": "GDP growth",
                "organ": "77.0.СОВ",
                "data": {"kind": "numerical", "values": [1.5, 2.0]}
            }])
        );
    }

    #[tokio::test]
    async fn test_data_without_store_is_not_found() {
        let req = Request::builder().uri("/data").body(Body::empty()).unwrap();
        let (status, body) = send(&app(Arc::new(EchoNode::default())), req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no cell store attached");
    }

    #[tokio::test]
    async fn test_run_serves_until_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, app(Arc::new(EchoNode::default())), async {
            let _ = rx.await;
        }));

        let client = reqwest::Client::new();
        let reply: Value = client
            .post(format!("http://{}/auth/rpc", addr))
            .body(BLOCK_NUMBER)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(reply["result"], "0x10");

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
