//! # RBAC Manager
//!
//! Backend of the RBAC administration console. Serves the console API over
//! the Kubernetes RBAC objects of the cluster it runs in.
//!
//! ## Configuration
//!
//! - `KUBE_API_URL` or `KUBERNETES_SERVICE_HOST`/`KUBERNETES_SERVICE_PORT` - API server
//! - `TOKEN` - bearer token (defaults to the mounted service account token)
//! - `SKIP_TLS_VERIFY` - accept the API server certificate unverified (default `true`)
//! - `PORT` - HTTP port (default 8080)
//! - `RUST_LOG` - tracing filter

use anyhow::Result;
use rbac_manager::runtime::initialization::initialize;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let init_result = initialize().await?;

    tokio::select! {
        result = init_result.server_handle => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
