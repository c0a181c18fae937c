//! # Console API Routes
//!
//! Thin handlers over the resolvers and CRUD helpers. Request bodies are
//! parsed from raw bytes, so clients that omit `Content-Type` still work.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::error::ApiError;
use super::ServerState;
use crate::bindings::{resolve_principal_cluster_roles, resolve_principal_roles};
use crate::catalog::{list_resource_types, ApiGrouping};
use crate::kubernetes::resources;
use crate::rbac::{group_rules, BoundRole, GroupedRules, Role, RoleBinding, ServiceAccount};

type ApiResult<T> = Result<T, ApiError>;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CatalogQuery {
    #[serde(default)]
    include_core: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct NamespaceQuery {
    namespace: Option<String>,
}

/// A resolved binding with its role's rules grouped for display
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BoundRoleView {
    role_binding: RoleBinding,
    role: Role,
    grouped_rules: GroupedRules,
}

impl From<BoundRole> for BoundRoleView {
    fn from(bound: BoundRole) -> Self {
        let grouped_rules = group_rules(&bound.role.rules);
        Self {
            role_binding: bound.role_binding,
            role: bound.role,
            grouped_rules,
        }
    }
}

pub(super) async fn api_resources(
    State(state): State<ServerState>,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<Json<Vec<ApiGrouping>>> {
    let catalog = list_resource_types(state.api.as_ref(), query.include_core).await?;
    Ok(Json(catalog))
}

pub(super) async fn list_service_accounts(
    State(state): State<ServerState>,
    Query(query): Query<NamespaceQuery>,
) -> ApiResult<Json<Vec<ServiceAccount>>> {
    let accounts =
        resources::list_service_accounts(state.api.as_ref(), query.namespace.as_deref()).await?;
    Ok(Json(accounts))
}

pub(super) async fn create_service_account(
    State(state): State<ServerState>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let account: ServiceAccount = parse_body(&body)?;
    let created = resources::create_service_account(state.api.as_ref(), &account).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn delete_service_account(
    State(state): State<ServerState>,
    Path((namespace, name)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let status = resources::delete_service_account(state.api.as_ref(), &namespace, &name).await?;
    info!("Deleted service account {}/{}", namespace, name);
    Ok(Json(status))
}

pub(super) async fn service_account_roles(
    State(state): State<ServerState>,
    Path((namespace, name)): Path<(String, String)>,
) -> ApiResult<Json<Vec<BoundRoleView>>> {
    let bound = resolve_principal_roles(state.api.as_ref(), &name, &namespace).await?;
    Ok(Json(bound.into_iter().map(BoundRoleView::from).collect()))
}

pub(super) async fn service_account_cluster_roles(
    State(state): State<ServerState>,
    Path((namespace, name)): Path<(String, String)>,
) -> ApiResult<Json<Vec<BoundRoleView>>> {
    let bound =
        resolve_principal_cluster_roles(state.api.as_ref(), &name, Some(&namespace)).await?;
    Ok(Json(bound.into_iter().map(BoundRoleView::from).collect()))
}

pub(super) async fn list_roles(
    State(state): State<ServerState>,
    Path(namespace): Path<String>,
) -> ApiResult<Json<Vec<Role>>> {
    Ok(Json(resources::list_roles(state.api.as_ref(), &namespace).await?))
}

pub(super) async fn create_role(
    State(state): State<ServerState>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let role: Role = parse_body(&body)?;
    let created = resources::create_role(state.api.as_ref(), &role).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn update_role(
    State(state): State<ServerState>,
    body: Bytes,
) -> ApiResult<Json<Role>> {
    let role: Role = parse_body(&body)?;
    Ok(Json(resources::update_role(state.api.as_ref(), &role).await?))
}

pub(super) async fn delete_role(
    State(state): State<ServerState>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let role: Role = parse_body(&body)?;
    let namespace = role.metadata.namespace.as_deref().unwrap_or_default();
    if namespace.is_empty() || role.metadata.name.is_empty() {
        return Err(ApiError::BadRequest(
            "role to delete needs metadata.name and metadata.namespace".to_string(),
        ));
    }
    let status = resources::delete_role(state.api.as_ref(), namespace, &role.metadata.name).await?;
    info!("Deleted role {}/{}", namespace, role.metadata.name);
    Ok(Json(status))
}

pub(super) async fn create_role_binding(
    State(state): State<ServerState>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let binding: RoleBinding = parse_body(&body)?;
    let created = resources::create_role_binding(state.api.as_ref(), &binding).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
