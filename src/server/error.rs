//! # Route Errors
//!
//! Maps failures to HTTP responses of the form `{"error": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::kubernetes::KubeError;

/// Error returned by a route handler
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be decoded
    #[error("bad request: {0}")]
    BadRequest(String),
    /// A Kubernetes API operation failed
    #[error(transparent)]
    Kube(#[from] KubeError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Keep the upstream status so callers can tell 404 from 409
            ApiError::Kube(KubeError::Status { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Kube(KubeError::InvalidObject(_) | KubeError::InvalidName { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Kube(KubeError::Transport { .. } | KubeError::Decode { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Kube(KubeError::Encode { .. } | KubeError::Config(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            ApiError::BadRequest(message) => json!(message),
            ApiError::Kube(err) => {
                error!("Kubernetes API operation failed: {}", err);
                err.upstream_body().unwrap_or_else(|| json!(err.to_string()))
            }
        };
        (status, Json(json!({ "error": detail }))).into_response()
    }
}
