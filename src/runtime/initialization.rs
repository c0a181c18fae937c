//! # Initialization
//!
//! Server initialization: rustls setup, tracing, metrics, Kubernetes client
//! creation and HTTP server startup.

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{self, ServerConfig};
use crate::constants::DEFAULT_LOG_FILTER;
use crate::kubernetes::KubeClient;
use crate::observability;
use crate::server::{start_server, ServerState};

/// Initialization result containing the running server
#[derive(Debug)]
pub struct InitializationResult {
    /// Server state for health checks
    pub server_state: ServerState,
    /// Handle of the HTTP server task
    pub server_handle: JoinHandle<()>,
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .try_init()
    {
        eprintln!("Tracing subscriber already initialized: {e}");
    }
}

/// Initialize the server runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - `.env` loading
/// - Tracing subscriber setup
/// - Metrics registration
/// - Kubernetes client creation
/// - HTTP server startup
pub async fn initialize() -> Result<InitializationResult> {
    // Must run before any TLS client is built
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    let dotenv = dotenvy::dotenv();

    init_tracing();
    info!("Starting RBAC Manager v{}", env!("CARGO_PKG_VERSION"));
    if !provider_installed {
        warn!("rustls crypto provider was already installed");
    }
    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    observability::metrics::register_metrics()?;

    let (kube_config, server_config) =
        config::load_config().context("Failed to load Kubernetes API configuration")?;
    info!("Kubernetes API: {}", kube_config.api_base_url);

    let client = KubeClient::new(kube_config).context("Failed to create Kubernetes client")?;
    let server_state = ServerState::new(Arc::new(client));

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let state = server_state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(addr, state).await {
            error!("HTTP server error: {:#}", e);
        }
    });

    wait_for_server_ready(&server_state, &server_handle, &server_config).await?;

    Ok(InitializationResult {
        server_state,
        server_handle,
    })
}

/// Poll until the server reports ready, the task dies, or the timeout passes
async fn wait_for_server_ready(
    state: &ServerState,
    handle: &JoinHandle<()>,
    config: &ServerConfig,
) -> Result<()> {
    let timeout = Duration::from_secs(config.startup_timeout_secs);
    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let started = tokio::time::Instant::now();

    while started.elapsed() < timeout {
        if state.is_ready.load(Ordering::Relaxed) {
            info!("✅ HTTP server is ready on port {}", config.port);
            return Ok(());
        }
        if handle.is_finished() {
            bail!("HTTP server exited during startup");
        }
        tokio::time::sleep(poll_interval).await;
    }
    bail!(
        "HTTP server did not become ready within {}s",
        config.startup_timeout_secs
    )
}
