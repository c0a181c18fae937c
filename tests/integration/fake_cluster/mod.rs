//! In-process fake of the Kubernetes API server.
//!
//! Serves registered JSON documents on GET, echoes bodies back on POST/PUT
//! (201 for POST, like the API server's create), and answers DELETE with a
//! Success status. Every request is recorded with its Authorization header.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TEST_TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct ClusterState {
    documents: Mutex<HashMap<String, Value>>,
    errors: Mutex<HashMap<String, (u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Debug)]
pub struct FakeCluster {
    pub base_url: String,
    state: Arc<ClusterState>,
    handle: JoinHandle<()>,
}

impl FakeCluster {
    pub async fn start() -> Self {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let state = Arc::new(ClusterState::default());
        let app = Router::new()
            .fallback(handle_request)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake cluster");
        let addr = listener.local_addr().expect("fake cluster address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake cluster server");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn with_get(self, path: &str, document: Value) -> Self {
        self.state
            .documents
            .lock()
            .unwrap()
            .insert(path.to_string(), document);
        self
    }

    /// Answer every request to `path` with a `Failure` status
    pub fn with_error(self, path: &str, status: u16, reason: &str) -> Self {
        self.state
            .errors
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, reason.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn client(&self) -> rbac_manager::KubeClient {
        let config = rbac_manager::KubeConfig::new(self.base_url.clone(), TEST_TOKEN)
            .with_skip_tls_verify(false);
        rbac_manager::KubeClient::new(config).expect("kube client")
    }
}

impl Drop for FakeCluster {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_request(
    State(state): State<Arc<ClusterState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.clone(),
    });

    if let Some((code, reason)) = state.errors.lock().unwrap().get(&path).cloned() {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = failure(code, &reason, &format!("{method} {path}: {reason}"));
        return (status, Json(body)).into_response();
    }

    if method == Method::GET {
        match state.documents.lock().unwrap().get(&path).cloned() {
            Some(document) => Json(document).into_response(),
            None => {
                let body = failure(404, "NotFound", &format!("{path} not found"));
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
        }
    } else if method == Method::POST {
        (StatusCode::CREATED, Json(body.unwrap_or(Value::Null))).into_response()
    } else if method == Method::PUT {
        Json(body.unwrap_or(Value::Null)).into_response()
    } else if method == Method::DELETE {
        Json(json!({"kind": "Status", "apiVersion": "v1", "status": "Success"})).into_response()
    } else {
        StatusCode::METHOD_NOT_ALLOWED.into_response()
    }
}

fn failure(code: u16, reason: &str, message: &str) -> Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
}

/// Discovery documents for a cluster serving `batch`, `apps` and the RBAC group
///
/// The group list is deliberately out of alphabetical order.
pub fn with_discovery(cluster: FakeCluster) -> FakeCluster {
    cluster
        .with_get(
            "/apis",
            json!({
                "kind": "APIGroupList",
                "apiVersion": "v1",
                "groups": [
                    group("rbac.authorization.k8s.io", "v1"),
                    group("batch", "v1"),
                    group("apps", "v1"),
                ]
            }),
        )
        .with_get(
            "/apis/batch/v1",
            resource_list("batch/v1", &[("jobs", "Job"), ("cronjobs", "CronJob")]),
        )
        .with_get(
            "/apis/apps/v1",
            resource_list("apps/v1", &[("deployments", "Deployment"), ("deployments/scale", "Scale")]),
        )
        .with_get(
            "/apis/rbac.authorization.k8s.io/v1",
            resource_list(
                "rbac.authorization.k8s.io/v1",
                &[("roles", "Role"), ("rolebindings", "RoleBinding")],
            ),
        )
        .with_get(
            "/api/v1",
            resource_list("v1", &[("pods", "Pod"), ("serviceaccounts", "ServiceAccount")]),
        )
}

/// RBAC objects of namespace `ns1`: `sa1` is bound to `pod-reader` and to a
/// role that no longer exists; `other` is bound to `pod-reader` too.
pub fn with_rbac(cluster: FakeCluster) -> FakeCluster {
    cluster
        .with_get(
            "/apis/rbac.authorization.k8s.io/v1/namespaces/ns1/rolebindings",
            json!({
                "kind": "RoleBindingList",
                "items": [
                    binding("read-pods", "Role", "pod-reader", "sa1"),
                    binding("stale", "Role", "deleted-role", "sa1"),
                    binding("other-read", "Role", "pod-reader", "other"),
                ]
            }),
        )
        .with_get(
            "/apis/rbac.authorization.k8s.io/v1/namespaces/ns1/roles",
            json!({
                "kind": "RoleList",
                "items": [{
                    "apiVersion": "rbac.authorization.k8s.io/v1",
                    "kind": "Role",
                    "metadata": {"name": "pod-reader", "namespace": "ns1"},
                    "rules": [
                        {"apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list"]},
                        {"apiGroups": ["apps", "batch"], "resources": ["deployments"], "verbs": ["*"]}
                    ]
                }]
            }),
        )
        .with_get(
            "/apis/rbac.authorization.k8s.io/v1/clusterrolebindings",
            json!({
                "kind": "ClusterRoleBindingList",
                "items": [binding("sa1-view", "ClusterRole", "view", "sa1")]
            }),
        )
        .with_get(
            "/apis/rbac.authorization.k8s.io/v1/clusterroles",
            json!({
                "kind": "ClusterRoleList",
                "items": [{
                    "metadata": {"name": "view"},
                    "rules": [{"apiGroups": [""], "resources": ["configmaps"], "verbs": ["get"]}]
                }]
            }),
        )
        .with_get(
            "/api/v1/namespaces/ns1/serviceaccounts",
            json!({
                "kind": "ServiceAccountList",
                "items": [
                    {"metadata": {"name": "sa1", "namespace": "ns1"}},
                    {"metadata": {"name": "other", "namespace": "ns1"}}
                ]
            }),
        )
}

fn group(name: &str, version: &str) -> Value {
    let gv = json!({"groupVersion": format!("{name}/{version}"), "version": version});
    json!({"name": name, "versions": [gv.clone()], "preferredVersion": gv})
}

fn resource_list(group_version: &str, resources: &[(&str, &str)]) -> Value {
    let resources: Vec<Value> = resources
        .iter()
        .map(|(name, kind)| {
            json!({
                "name": name,
                "singularName": "",
                "namespaced": true,
                "kind": kind,
                "verbs": ["get", "list", "create", "delete"]
            })
        })
        .collect();
    json!({"kind": "APIResourceList", "groupVersion": group_version, "resources": resources})
}

fn binding(name: &str, role_kind: &str, role_name: &str, account: &str) -> Value {
    json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": if role_kind == "Role" { "RoleBinding" } else { "ClusterRoleBinding" },
        "metadata": {"name": name, "namespace": "ns1"},
        "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": role_kind, "name": role_name},
        "subjects": [{"kind": "ServiceAccount", "name": account, "namespace": "ns1"}]
    })
}
