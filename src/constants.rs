//! # Constants
//!
//! Default values and well-known names shared across the crate.

/// Default HTTP port for the console API, metrics and health checks
pub const DEFAULT_PORT: u16 = 8080;

/// Default server startup timeout in seconds
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default server readiness poll interval in milliseconds
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Whether TLS verification of the API server is skipped when not configured.
/// The console has always talked to the in-cluster API with verification off.
pub const DEFAULT_SKIP_TLS_VERIFY: bool = true;

/// Mounted service account token used when `TOKEN` is not set
pub const IN_CLUSTER_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "rbac_manager=info,tower_http=info";

// Environment variable names
pub const ENV_TOKEN: &str = "TOKEN";
pub const ENV_KUBE_API_URL: &str = "KUBE_API_URL";
pub const ENV_KUBERNETES_SERVICE_HOST: &str = "KUBERNETES_SERVICE_HOST";
pub const ENV_KUBERNETES_SERVICE_PORT: &str = "KUBERNETES_SERVICE_PORT";
pub const ENV_SKIP_TLS_VERIFY: &str = "SKIP_TLS_VERIFY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_SERVER_STARTUP_TIMEOUT_SECS: &str = "SERVER_STARTUP_TIMEOUT_SECS";
pub const ENV_SERVER_POLL_INTERVAL_MS: &str = "SERVER_POLL_INTERVAL_MS";

/// RBAC API group
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// RBAC group/version used for every RBAC object this crate writes
pub const RBAC_API_VERSION: &str = "rbac.authorization.k8s.io/v1";

/// Core API version
pub const CORE_API_VERSION: &str = "v1";

/// Subject kind for service accounts
pub const SERVICE_ACCOUNT_KIND: &str = "ServiceAccount";

/// Display label for the core API group (whose name is the empty string)
pub const CORE_GROUP_LABEL: &str = "core";
