//! # Configuration
//!
//! Process configuration loaded from environment variables.
//!
//! All settings have defaults except the API server location and token,
//! which must come from the environment (or the in-cluster mounts).
//! A `.env` file in the working directory is honoured at startup.

mod kube;
mod server;

pub use kube::KubeConfig;
pub use server::ServerConfig;

use anyhow::Result;

/// Load configuration from environment variables with defaults
pub fn load_config() -> Result<(KubeConfig, ServerConfig)> {
    Ok((KubeConfig::from_env()?, ServerConfig::from_env()))
}

/// Read environment variable or return default value
pub(crate) fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean the way operators write them in ConfigMaps
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
