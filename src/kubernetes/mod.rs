//! # Kubernetes API Access
//!
//! The only way this crate reaches the cluster. Resolvers and route handlers
//! depend on the [`KubernetesApi`] trait; [`KubeClient`] implements it on
//! top of `kube::Client`.
//!
//! ## Sub-modules
//!
//! - `client` - `kube::Client` implementation with bearer token auth
//! - `error` - error taxonomy
//! - `paths` - REST path builders with namespace and name validation
//! - `resources` - typed CRUD helpers over the trait

mod client;
mod error;
pub mod paths;
pub mod resources;

#[cfg(test)]
pub(crate) mod fake;

pub use client::KubeClient;
pub use error::KubeError;
pub use http::Method;

use async_trait::async_trait;
use serde_json::Value;

/// A JSON request/response channel to the Kubernetes API server
#[async_trait]
pub trait KubernetesApi: Send + Sync {
    /// Issue one request and return the decoded JSON body
    ///
    /// An empty success body is returned as `Value::Null`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, KubeError>;

    async fn get(&self, path: &str) -> Result<Value, KubeError> {
        self.request(Method::GET, path, None).await
    }
}
