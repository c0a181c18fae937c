//! In-memory [`KubernetesApi`] for unit tests.
//!
//! GETs answer from registered documents; writes echo their body back the
//! way the API server returns the stored object. Unregistered GETs are 404.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{KubeError, KubernetesApi, Method};

type RecordedRequest = (Method, String, Option<Value>);

#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    documents: HashMap<String, Value>,
    errors: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_get(mut self, path: &str, document: Value) -> Self {
        self.documents.insert(path.to_string(), document);
        self
    }

    /// Fail every request to `path` with `status` and the `Status` reason `reason`
    pub(crate) fn with_error(mut self, path: &str, status: u16, reason: &str) -> Self {
        self.errors
            .insert(path.to_string(), (status, reason.to_string()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn status_error(method: &Method, path: &str, status: u16, reason: &str) -> KubeError {
    KubeError::Status {
        method: method.to_string(),
        path: path.to_string(),
        status,
        reason: reason.to_string(),
        message: format!("{method} {path}: {reason}"),
    }
}

#[async_trait]
impl KubernetesApi for FakeApi {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, KubeError> {
        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.to_string(), body.clone()));

        if let Some((status, reason)) = self.errors.get(path) {
            return Err(status_error(&method, path, *status, reason));
        }

        if method == Method::GET {
            self.documents
                .get(path)
                .cloned()
                .ok_or_else(|| status_error(&method, path, 404, "NotFound"))
        } else if method == Method::DELETE {
            Ok(json!({"kind": "Status", "status": "Success"}))
        } else {
            Ok(body.unwrap_or(Value::Null))
        }
    }
}
