//! # HTTP Server
//!
//! Serves the console API, Prometheus metrics and health checks.
//!
//! Console routes live under `/api/kubernetes`; unsupported methods on a
//! known path are answered with 405 by the router.

mod error;
mod routes;

pub use error::ApiError;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::kubernetes::KubernetesApi;
use crate::observability::metrics;

/// Shared state of the HTTP server
#[derive(Clone)]
pub struct ServerState {
    pub api: Arc<dyn KubernetesApi>,
    pub is_ready: Arc<AtomicBool>,
}

impl fmt::Debug for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerState")
            .field("is_ready", &self.is_ready.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ServerState {
    pub fn new(api: Arc<dyn KubernetesApi>) -> Self {
        Self {
            api,
            is_ready: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Build the router with every route
pub fn router(state: ServerState) -> Router {
    let console = Router::new()
        .route("/api-resources", get(routes::api_resources))
        .route(
            "/serviceaccounts",
            get(routes::list_service_accounts).post(routes::create_service_account),
        )
        .route(
            "/serviceaccounts/{namespace}/{name}",
            axum::routing::delete(routes::delete_service_account),
        )
        .route(
            "/serviceaccounts/{namespace}/{name}/roles",
            get(routes::service_account_roles),
        )
        .route(
            "/serviceaccounts/{namespace}/{name}/clusterroles",
            get(routes::service_account_cluster_roles),
        )
        .route(
            "/roles",
            axum::routing::post(routes::create_role)
                .put(routes::update_role)
                .delete(routes::delete_role),
        )
        .route("/roles/{namespace}", get(routes::list_roles))
        .route(
            "/rolebindings",
            axum::routing::post(routes::create_role_binding),
        );

    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .nest("/api/kubernetes", console)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "OK"
}

async fn readyz(State(state): State<ServerState>) -> impl IntoResponse {
    if state.is_ready.load(Ordering::Relaxed) {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Bind `addr` and serve until the process exits
///
/// Readiness flips to true once the listener is bound.
///
/// # Errors
///
/// Fails when the address cannot be bound or the server stops with an error.
pub async fn start_server(addr: SocketAddr, state: ServerState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {addr}"))?;
    serve(listener, state).await
}

/// Serve on an already bound listener
///
/// # Errors
///
/// Fails when the server stops with an error.
pub async fn serve(listener: TcpListener, state: ServerState) -> Result<()> {
    let local_addr = listener.local_addr()?;
    let is_ready = Arc::clone(&state.is_ready);
    let app = router(state);

    info!("HTTP server listening on {}", local_addr);
    is_ready.store(true, Ordering::Relaxed);

    let result = axum::serve(listener, app).await;
    is_ready.store(false, Ordering::Relaxed);
    result.context("HTTP server error")
}
