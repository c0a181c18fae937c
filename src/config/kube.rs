//! # Kubernetes API Configuration
//!
//! Location and credentials of the Kubernetes API server.

use std::fmt;

use super::parse_bool;
use crate::constants::{
    DEFAULT_SKIP_TLS_VERIFY, ENV_KUBERNETES_SERVICE_HOST, ENV_KUBERNETES_SERVICE_PORT,
    ENV_KUBE_API_URL, ENV_SKIP_TLS_VERIFY, ENV_TOKEN, IN_CLUSTER_TOKEN_PATH,
};
use crate::kubernetes::KubeError;

/// Connection settings for the Kubernetes API
///
/// Passed explicitly to [`crate::kubernetes::KubeClient::new`]; nothing in the
/// crate reads the token or host from the process environment on its own.
#[derive(Clone, PartialEq, Eq)]
pub struct KubeConfig {
    /// Bearer token sent on every request
    pub token: String,
    /// Base URL of the API server, e.g. `https://10.0.0.1:443`
    pub api_base_url: String,
    /// Accept the API server certificate without verification
    pub skip_tls_verify: bool,
}

impl fmt::Debug for KubeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeConfig")
            .field("token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .finish()
    }
}

impl KubeConfig {
    pub fn new(api_base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            skip_tls_verify: DEFAULT_SKIP_TLS_VERIFY,
        }
    }

    #[must_use]
    pub fn with_skip_tls_verify(mut self, skip: bool) -> Self {
        self.skip_tls_verify = skip;
        self
    }

    /// Load configuration from the process environment
    ///
    /// Falls back to the mounted service account token when `TOKEN` is unset.
    ///
    /// # Errors
    ///
    /// Returns [`KubeError::Config`] when no API server location or no token
    /// can be determined.
    pub fn from_env() -> Result<Self, KubeError> {
        Self::from_lookup(|key| std::env::var(key).ok(), || {
            std::fs::read_to_string(IN_CLUSTER_TOKEN_PATH).ok()
        })
    }

    /// Build configuration from an arbitrary variable source
    ///
    /// `token_file` is consulted only when the `TOKEN` variable is missing.
    ///
    /// # Errors
    ///
    /// See [`KubeConfig::from_env`].
    pub fn from_lookup<F, T>(lookup: F, token_file: T) -> Result<Self, KubeError>
    where
        F: Fn(&str) -> Option<String>,
        T: FnOnce() -> Option<String>,
    {
        let api_base_url = match lookup(ENV_KUBE_API_URL).filter(|v| !v.trim().is_empty()) {
            Some(url) => url,
            None => {
                let host = lookup(ENV_KUBERNETES_SERVICE_HOST).ok_or_else(|| {
                    KubeError::Config(format!(
                        "neither {ENV_KUBE_API_URL} nor {ENV_KUBERNETES_SERVICE_HOST} is set"
                    ))
                })?;
                let port = lookup(ENV_KUBERNETES_SERVICE_PORT).unwrap_or_else(|| "443".to_string());
                // IPv6 service hosts need brackets in a URL
                if host.contains(':') && !host.starts_with('[') {
                    format!("https://[{host}]:{port}")
                } else {
                    format!("https://{host}:{port}")
                }
            }
        };

        let token = lookup(ENV_TOKEN)
            .or_else(token_file)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                KubeError::Config(format!(
                    "no bearer token: set {ENV_TOKEN} or mount {IN_CLUSTER_TOKEN_PATH}"
                ))
            })?;

        let skip_tls_verify = match lookup(ENV_SKIP_TLS_VERIFY) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                KubeError::Config(format!("{ENV_SKIP_TLS_VERIFY} must be a boolean, got '{raw}'"))
            })?,
            None => DEFAULT_SKIP_TLS_VERIFY,
        };

        Ok(Self::new(api_base_url, token).with_skip_tls_verify(skip_tls_verify))
    }
}
