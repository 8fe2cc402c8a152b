//! Rate limiting middleware.
//!
//! Fixed-window counter per client: every request increments the client's
//! counter, requests beyond the threshold are rejected with `503`, and a
//! background task clears all counters once per window. An increment racing
//! with the clear may be lost.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderValue, Request, StatusCode},
    response::Response,
};
use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::debug;

use crate::domain::RateLimitConfig;

/// Per-client request counters shared across requests.
pub struct RateLimitState {
    counters: DashMap<String, AtomicU32>,
    config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            counters: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count one request for `client`; `false` if it exceeds the threshold.
    pub fn check(&self, client: &str) -> bool {
        if !self.config.enabled {
            return true;
        }

        let count = match self.counters.get(client) {
            Some(counter) => counter.fetch_add(1, Ordering::Relaxed) + 1,
            None => {
                let counter = self
                    .counters
                    .entry(client.to_owned())
                    .or_insert_with(|| AtomicU32::new(0));
                counter.fetch_add(1, Ordering::Relaxed) + 1
            }
        };

        count <= self.config.max_requests_per_window
    }

    /// Clear every counter, starting a new window.
    pub fn reset(&self) {
        self.counters.clear();
    }

    /// Number of clients seen in the current window.
    pub fn client_count(&self) -> usize {
        self.counters.len()
    }

    /// Requests counted for `client` in the current window.
    pub fn count_for(&self, client: &str) -> u32 {
        self.counters
            .get(client)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

/// Rate limit layer
#[derive(Clone)]
pub struct RateLimitLayer {
    state: Arc<RateLimitState>,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_state(Arc::new(RateLimitState::new(config)))
    }

    pub fn with_state(state: Arc<RateLimitState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> Arc<RateLimitState> {
        Arc::clone(&self.state)
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

/// Rate limit service
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: Arc<RateLimitState>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        // take the instance that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let client = extract_client_id(&req);

            if state.check(&client) {
                inner.call(req).await
            } else {
                debug!(client = %client, "Rate limit exceeded");
                Ok(rate_limit_response(state.config()))
            }
        })
    }
}

/// Client identity: first `X-Forwarded-For` entry, else the peer address.
pub fn extract_client_id<B>(req: &Request<B>) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());
    if let Some(first) = forwarded {
        return first.to_owned();
    }

    if let Some(connect_info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    "unknown".to_owned()
}

/// `503` with the rate-limit JSON error body.
pub fn rate_limit_response(config: &RateLimitConfig) -> Response {
    let period = if config.window == Duration::from_secs(60) {
        "minute".to_owned()
    } else {
        format!("{} seconds", config.window.as_secs())
    };
    let body = serde_json::json!({
        "error": format!(
            "Zarya Data: Rate limit exceeded. Maximum {} requests per {} allowed.",
            config.max_requests_per_window, period
        )
    });

    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Background task clearing all counters every `window`, first after one
/// full window.
pub async fn reset_task(state: Arc<RateLimitState>, window: Duration) {
    let start = tokio::time::Instant::now() + window;
    let mut ticker = tokio::time::interval_at(start, window);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let clients = state.client_count();
        state.reset();
        debug!(clients, "Rate limit window reset");
    }
}
