//! Shared utilities for bridge tests.

use aas_delegate_adapter_aas::{AasClientConfig, PropertyTarget, ValuePropagator};
use aas_delegate_bridge::{Bridge, DEFAULT_MAX_BODY_BYTES};
use aas_delegate_core::Normalizer;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::patch;
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const SUBMODEL_ID: &str = "urn:example:sm:ops:1";

/// A recorded `PATCH` received by the mock repository.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct RepoState {
    status: StatusCode,
    reply: &'static str,
    delay: Duration,
    writes: Arc<Mutex<Vec<RecordedWrite>>>,
}

/// In-process stand-in for a submodel repository's `$value` endpoint.
pub struct MockRepository {
    pub addr: SocketAddr,
    writes: Arc<Mutex<Vec<RecordedWrite>>>,
}

impl MockRepository {
    /// Repository that accepts every write with 204.
    pub async fn accepting() -> Self {
        Self::start(StatusCode::NO_CONTENT, "", Duration::ZERO).await
    }

    /// Repository answering every write with `status` and `reply`.
    pub async fn replying(status: u16, reply: &'static str) -> Self {
        Self::start(StatusCode::from_u16(status).unwrap(), reply, Duration::ZERO).await
    }

    /// Repository that accepts writes after `delay`.
    pub async fn slow(delay: Duration) -> Self {
        Self::start(StatusCode::NO_CONTENT, "", delay).await
    }

    async fn start(status: StatusCode, reply: &'static str, delay: Duration) -> Self {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let state = RepoState {
            status,
            reply,
            delay,
            writes: writes.clone(),
        };
        let app = Router::new()
            .route("/{*path}", patch(record_write))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, writes }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    /// Value currently held by the property, as last written.
    pub fn current_value(&self) -> Option<Value> {
        self.writes()
            .last()
            .map(|w| serde_json::from_str(&w.body).unwrap())
    }
}

async fn record_write(State(state): State<RepoState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let content_type = request
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap();

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    state.writes.lock().unwrap().push(RecordedWrite {
        path,
        content_type,
        body: String::from_utf8(body.to_vec()).unwrap(),
    });

    (state.status, state.reply).into_response()
}

/// Bridge writing `pumpValue` in the mock repository.
pub fn bridge_for(repo: &MockRepository, timeout: Duration) -> Arc<Bridge> {
    bridge_at(&repo.base_url(), timeout)
}

/// Bridge writing `pumpValue` in the repository at `base_url`.
pub fn bridge_at(base_url: &str, timeout: Duration) -> Arc<Bridge> {
    let target = PropertyTarget::new(base_url, SUBMODEL_ID, "pumpValue").unwrap();
    let config = AasClientConfig {
        timeout,
        ..Default::default()
    };
    let propagator = ValuePropagator::new(config, target).unwrap();
    Arc::new(Bridge::new(Normalizer::default(), propagator))
}

/// Send one `POST /op` through the bridge router.
pub async fn post_op(bridge: Arc<Bridge>, body: impl Into<Bytes>) -> (StatusCode, Value) {
    post_op_limited(bridge, DEFAULT_MAX_BODY_BYTES, body).await
}

/// Send one `POST /op` through a router capping bodies at `max_body_bytes`.
pub async fn post_op_limited(
    bridge: Arc<Bridge>,
    max_body_bytes: usize,
    body: impl Into<Bytes>,
) -> (StatusCode, Value) {
    let request = axum::http::Request::post("/op")
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    let response = aas_delegate_bridge::router(bridge, max_body_bytes)
        .oneshot(request)
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
