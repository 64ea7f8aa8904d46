// src/server.rs

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::config::RateLimitConfig;

pub struct AppState {
    pub aggregator: Aggregator,
    pub rate_limiter: Option<RateLimiter>,
}

#[derive(Deserialize)]
pub struct CheckRequest {
    pub address: String,
}

/// Fixed-window per-IP limiter. Good enough for a single instance; a
/// shared store would be needed behind a load balancer.
pub struct RateLimiter {
    requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimitVerdict {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            requests: config.requests,
            window: config.window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, ip: IpAddr) -> RateLimitVerdict {
        let now = Instant::now();
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            // A poisoned lock fails open.
            Err(poisoned) => poisoned.into_inner(),
        };

        let window = windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }
        window.count += 1;

        let allowed = window.count <= self.requests;
        let reset = self
            .window
            .saturating_sub(now.duration_since(window.started));
        RateLimitVerdict {
            allowed,
            limit: self.requests,
            remaining: self.requests.saturating_sub(window.count),
            reset_secs: reset.as_secs(),
        }
    }

    /// Drops windows that have fully elapsed.
    pub fn sweep(&self) {
        let now = Instant::now();
        if let Ok(mut windows) = self.windows.lock() {
            windows.retain(|_, w| now.duration_since(w.started) < self.window);
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn check_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(request): Json<CheckRequest>,
) -> Response {
    let verdict = state.rate_limiter.as_ref().map(|limiter| limiter.check(peer.ip()));

    if let Some(verdict) = &verdict {
        if !verdict.allowed {
            warn!(ip = %peer.ip(), "rate limit exceeded");
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": format!("rate limit exceeded, retry in {}s", verdict.reset_secs)
                })),
            )
                .into_response();
            set_rate_limit_headers(&mut response, verdict);
            return response;
        }
    }

    let mut response = handle_check(&state, &request).await;
    // Clients see their remaining quota on every rate-limited route.
    if let Some(verdict) = &verdict {
        set_rate_limit_headers(&mut response, verdict);
    }
    response
}

async fn handle_check(state: &AppState, request: &CheckRequest) -> Response {
    if let Err(reason) = validate_address(&request.address) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": reason })),
        )
            .into_response();
    }

    info!(address = %request.address, "received wallet check request");

    match state.aggregator.check_wallet(&request.address).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            warn!(address = %request.address, error = %e, "wallet check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn set_rate_limit_headers(response: &mut Response, verdict: &RateLimitVerdict) {
    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&verdict.limit.to_string()) {
        headers.insert("X-RateLimit-Limit", v);
    }
    if let Ok(v) = HeaderValue::from_str(&verdict.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", v);
    }
    if let Ok(v) = HeaderValue::from_str(&verdict.reset_secs.to_string()) {
        headers.insert("X-RateLimit-Reset", v);
    }
}

/// Accepts a 0x-prefixed 20-byte hex address, any letter case.
pub fn validate_address(address: &str) -> Result<(), &'static str> {
    if address.len() != 42 {
        return Err("address must be 42 characters");
    }
    if !address.starts_with("0x") {
        return Err("address must start with 0x");
    }
    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("address must be hexadecimal");
    }
    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/check", post(check_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(port: u16, state: Arc<AppState>) -> Result<(), std::io::Error> {
    if state.rate_limiter.is_some() {
        let sweep_state = state.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(60));
            loop {
                tick.tick().await;
                if let Some(limiter) = &sweep_state.rate_limiter {
                    limiter.sweep();
                }
            }
        });
    }

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr, "server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
