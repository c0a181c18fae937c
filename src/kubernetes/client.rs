//! # Kubernetes API Client
//!
//! `kube::Client`-backed implementation of [`KubernetesApi`].
//!
//! The client is built from an explicit [`KubeConfig`] rather than a
//! kubeconfig file or in-cluster inference: the cluster URL, the bearer token
//! and the TLS verification switch are the whole configuration. Responses are
//! returned as raw JSON; typed decoding happens in [`super::resources`].

use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request, Uri};
use secrecy::SecretString;
use serde_json::Value;
use std::fmt;
use std::time::Instant;
use tracing::{debug, warn};

use super::{KubeError, KubernetesApi};
use crate::config::KubeConfig;
use crate::observability::metrics;

/// Client for the Kubernetes API server
#[derive(Clone)]
pub struct KubeClient {
    client: kube::Client,
    config: KubeConfig,
}

impl fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KubeClient {
    /// Create a client for the configured API server
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`KubeError::Config`] when the base URL is empty or not a URI,
    /// or when the underlying `kube::Client` cannot be built.
    pub fn new(config: KubeConfig) -> Result<Self, KubeError> {
        if config.api_base_url.trim().is_empty() {
            return Err(KubeError::Config("API base URL is empty".to_string()));
        }
        let cluster_url: Uri = config.api_base_url.parse().map_err(|e| {
            KubeError::Config(format!(
                "invalid API server URL '{}': {e}",
                config.api_base_url
            ))
        })?;
        if config.skip_tls_verify {
            warn!(
                "TLS certificate verification is disabled for {}",
                config.api_base_url
            );
        }

        let mut kube_config = kube::Config::new(cluster_url);
        kube_config.auth_info.token = Some(SecretString::from(config.token.clone()));
        kube_config.accept_invalid_certs = config.skip_tls_verify;

        let client = kube::Client::try_from(kube_config)
            .map_err(|e| KubeError::Config(format!("failed to create Kubernetes client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &KubeConfig {
        &self.config
    }

    async fn execute(
        &self,
        method: &Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, KubeError> {
        let payload = match body {
            Some(body) => serde_json::to_vec(&body).map_err(|source| KubeError::Encode {
                path: path.to_string(),
                source,
            })?,
            None => Vec::new(),
        };
        let request = Request::builder()
            .method(method.clone())
            .uri(path)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .map_err(|e| KubeError::InvalidObject(format!("cannot build request for {path}: {e}")))?;

        let text = self
            .client
            .request_text(request)
            .await
            .map_err(|e| KubeError::from_kube(method.as_str(), path, e))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| KubeError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl KubernetesApi for KubeClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, KubeError> {
        debug!("Kubernetes API {} {}", method, path);

        let started = Instant::now();
        let result = self.execute(&method, path, body).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.reason(),
        };
        metrics::observe_kube_request(method.as_str(), outcome, started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            debug!("Kubernetes API {} {} failed: {}", method, path, e);
        }
        result
    }
}
