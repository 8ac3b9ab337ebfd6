//! HTTP server setup.
//!
//! Routes:
//! - `POST /op`: delegated Operation invocation
//! - `GET /health`: liveness probe

use crate::controller::Bridge;
use crate::response::{error_response, rejection_response, Envelope};
use aas_delegate_core::InvocationError;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared, immutable bridge
    pub bridge: Arc<Bridge>,
}

/// Build the bridge router with all middleware layers.
///
/// Bodies larger than `max_body_bytes` are answered with a JSON 413.
pub fn router(bridge: Arc<Bridge>, max_body_bytes: usize) -> Router {
    let routes = Router::new()
        .route("/health", get(health))
        .route("/op", post(invoke))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(AppState { bridge });
    with_middleware(routes)
}

/// Wrap routes in panic recovery, request tracing and request ids.
pub fn with_middleware(routes: Router) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve the bridge until `shutdown` resolves.
///
/// # Errors
///
/// Returns error if the listener fails.
pub async fn serve<F>(
    listener: TcpListener,
    bridge: Arc<Bridge>,
    max_body_bytes: usize,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(
        address = %addr,
        target_url = %bridge.target(),
        max_body_bytes,
        "HTTP server starting"
    );

    axum::serve(listener, router(bridge, max_body_bytes))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn invoke(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => Envelope(state.bridge.invoke(&body).await).into_response(),
        Err(rejection) => {
            tracing::warn!(
                status = rejection.status().as_u16(),
                error = %rejection.body_text(),
                "Request body rejected"
            );
            rejection_response(&rejection)
        }
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "request handler panicked".to_string()
    };

    tracing::error!(error = %message, "Request handler panicked");
    error_response(&InvocationError::Internal { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn boom() -> &'static str {
        panic!("exploded")
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        let app = with_middleware(Router::new().route("/boom", get(boom)));

        let response = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key("x-request-id"));
        let body = body_json(response).await;
        assert_eq!(body["message"], "Unexpected error");
        assert_eq!(body["error"], "exploded");
    }
}
