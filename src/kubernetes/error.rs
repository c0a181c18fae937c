//! # Kubernetes API Error Types
//!
//! Failures talking to the API server, classified for logging and metrics.

use serde_json::{json, Value};
use thiserror::Error;

/// Error raised by a Kubernetes API operation
#[derive(Debug, Error)]
pub enum KubeError {
    /// Network, DNS or TLS failure before a usable response arrived
    #[error("transport error on {method} {path}: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: kube::Error,
    },
    /// The API server answered with a non-success status
    #[error("Kubernetes API returned {status} for {method} {path}: {message}")]
    Status {
        method: String,
        path: String,
        status: u16,
        /// `reason` of the upstream `Status` object, e.g. `NotFound`
        reason: String,
        message: String,
    },
    /// A response body did not have the expected shape
    #[error("failed to decode response of {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// An object could not be serialized into a request body
    #[error("failed to encode request body for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// A namespace or name cannot be used as a path segment
    #[error("invalid {field} '{value}': {constraint}")]
    InvalidName {
        field: &'static str,
        value: String,
        constraint: &'static str,
    },
    /// An object submitted for writing is missing required fields
    #[error("invalid object: {0}")]
    InvalidObject(String),
    /// Client configuration is incomplete or unusable
    #[error("invalid Kubernetes API configuration: {0}")]
    Config(String),
}

impl KubeError {
    /// Classify a `kube::Error` raised by one request
    ///
    /// Error statuses the API server answered with become [`KubeError::Status`];
    /// everything else is a transport failure.
    pub(crate) fn from_kube(method: &str, path: &str, error: kube::Error) -> Self {
        match error {
            kube::Error::Api(response) => KubeError::Status {
                method: method.to_string(),
                path: path.to_string(),
                status: response.code,
                reason: response.reason.clone(),
                message: response.message.clone(),
            },
            source => KubeError::Transport {
                method: method.to_string(),
                path: path.to_string(),
                source,
            },
        }
    }

    /// Short reason string for metrics labels
    pub fn reason(&self) -> &'static str {
        match self {
            KubeError::Transport { .. } => "transport",
            KubeError::Status { status, .. } => match status {
                401 => "unauthorized",
                403 => "forbidden",
                404 => "not_found",
                409 => "conflict",
                422 => "invalid",
                500..=599 => "server_error",
                _ => "status",
            },
            KubeError::Decode { .. } => "decode",
            KubeError::Encode { .. } => "encode",
            KubeError::InvalidName { .. } => "invalid_name",
            KubeError::InvalidObject(_) => "invalid_object",
            KubeError::Config(_) => "config",
        }
    }

    /// HTTP status returned by the API server, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            KubeError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The upstream error as a `meta/v1` `Status` object
    pub fn upstream_body(&self) -> Option<Value> {
        match self {
            KubeError::Status {
                status,
                reason,
                message,
                ..
            } => Some(json!({
                "kind": "Status",
                "apiVersion": "v1",
                "status": "Failure",
                "message": message,
                "reason": reason,
                "code": status,
            })),
            _ => None,
        }
    }
}
