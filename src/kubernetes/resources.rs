//! # Typed Resource Operations
//!
//! CRUD wrappers for the objects the console manages, on top of any
//! [`KubernetesApi`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{paths, KubeError, KubernetesApi, Method};
use crate::constants::{CORE_API_VERSION, RBAC_API_VERSION};
use crate::rbac::types::ObjectList;
use crate::rbac::{
    APIGroup, APIGroupList, APIResource, APIResourceList, ClusterRole, ClusterRoleBinding,
    Metadata, Role, RoleBinding, ServiceAccount,
};

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, KubeError> {
    serde_json::from_value(value).map_err(|source| KubeError::Decode {
        path: path.to_string(),
        source,
    })
}

fn encode<T: Serialize>(path: &str, object: &T) -> Result<Value, KubeError> {
    serde_json::to_value(object).map_err(|source| KubeError::Encode {
        path: path.to_string(),
        source,
    })
}

async fn list<A, T>(api: &A, path: &str) -> Result<Vec<T>, KubeError>
where
    A: KubernetesApi + ?Sized,
    T: DeserializeOwned,
{
    let value = api.get(path).await?;
    Ok(decode::<ObjectList<T>>(path, value)?
        .items
        .unwrap_or_default())
}

async fn write<A, T>(api: &A, method: Method, path: &str, object: &T) -> Result<T, KubeError>
where
    A: KubernetesApi + ?Sized,
    T: Serialize + DeserializeOwned,
{
    let body = encode(path, object)?;
    let value = api.request(method, path, Some(body)).await?;
    decode(path, value)
}

/// Namespace and name of an object about to be written
fn namespaced_target<'a>(kind: &str, metadata: &'a Metadata) -> Result<(&'a str, &'a str), KubeError> {
    let namespace = metadata
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .ok_or_else(|| KubeError::InvalidObject(format!("{kind} has no metadata.namespace")))?;
    if metadata.name.is_empty() {
        return Err(KubeError::InvalidObject(format!(
            "{kind} has no metadata.name"
        )));
    }
    Ok((namespace, metadata.name.as_str()))
}

fn fill_type_meta(api_version: &mut Option<String>, kind: &mut Option<String>, v: &str, k: &str) {
    if api_version.is_none() {
        *api_version = Some(v.to_string());
    }
    if kind.is_none() {
        *kind = Some(k.to_string());
    }
}

// Service accounts

/// List service accounts in one namespace, or in all namespaces
pub async fn list_service_accounts<A: KubernetesApi + ?Sized>(
    api: &A,
    namespace: Option<&str>,
) -> Result<Vec<ServiceAccount>, KubeError> {
    list(api, &paths::service_accounts(namespace)?).await
}

pub async fn create_service_account<A: KubernetesApi + ?Sized>(
    api: &A,
    service_account: &ServiceAccount,
) -> Result<ServiceAccount, KubeError> {
    let (namespace, name) = namespaced_target("ServiceAccount", &service_account.metadata)?;
    let mut object = service_account.clone();
    fill_type_meta(
        &mut object.api_version,
        &mut object.kind,
        CORE_API_VERSION,
        "ServiceAccount",
    );
    info!("Creating ServiceAccount {}/{}", namespace, name);
    let path = paths::service_accounts(Some(namespace))?;
    write(api, Method::POST, &path, &object).await
}

pub async fn delete_service_account<A: KubernetesApi + ?Sized>(
    api: &A,
    namespace: &str,
    name: &str,
) -> Result<Value, KubeError> {
    let path = paths::service_account(namespace, name)?;
    info!("Deleting ServiceAccount {}/{}", namespace, name);
    api.request(Method::DELETE, &path, None).await
}

// Roles

pub async fn list_roles<A: KubernetesApi + ?Sized>(
    api: &A,
    namespace: &str,
) -> Result<Vec<Role>, KubeError> {
    list(api, &paths::roles(namespace)?).await
}

pub async fn list_cluster_roles<A: KubernetesApi + ?Sized>(
    api: &A,
) -> Result<Vec<ClusterRole>, KubeError> {
    list(api, &paths::cluster_roles()).await
}

pub async fn create_role<A: KubernetesApi + ?Sized>(api: &A, role: &Role) -> Result<Role, KubeError> {
    let (namespace, name) = namespaced_target("Role", &role.metadata)?;
    let mut object = role.clone();
    fill_type_meta(&mut object.api_version, &mut object.kind, RBAC_API_VERSION, "Role");
    let path = paths::roles(namespace)?;
    info!("Creating Role {}/{}", namespace, name);
    write(api, Method::POST, &path, &object).await
}

/// Replace an existing role
pub async fn update_role<A: KubernetesApi + ?Sized>(api: &A, role: &Role) -> Result<Role, KubeError> {
    let (namespace, name) = namespaced_target("Role", &role.metadata)?;
    let mut object = role.clone();
    fill_type_meta(&mut object.api_version, &mut object.kind, RBAC_API_VERSION, "Role");
    let path = paths::role(namespace, name)?;
    info!("Updating Role {}/{}", namespace, name);
    write(api, Method::PUT, &path, &object).await
}

pub async fn delete_role<A: KubernetesApi + ?Sized>(
    api: &A,
    namespace: &str,
    name: &str,
) -> Result<Value, KubeError> {
    let path = paths::role(namespace, name)?;
    info!("Deleting Role {}/{}", namespace, name);
    api.request(Method::DELETE, &path, None).await
}

// Role bindings

pub async fn list_role_bindings<A: KubernetesApi + ?Sized>(
    api: &A,
    namespace: &str,
) -> Result<Vec<RoleBinding>, KubeError> {
    list(api, &paths::role_bindings(namespace)?).await
}

pub async fn list_cluster_role_bindings<A: KubernetesApi + ?Sized>(
    api: &A,
) -> Result<Vec<ClusterRoleBinding>, KubeError> {
    list(api, &paths::cluster_role_bindings()).await
}

pub async fn create_role_binding<A: KubernetesApi + ?Sized>(
    api: &A,
    binding: &RoleBinding,
) -> Result<RoleBinding, KubeError> {
    let (namespace, name) = namespaced_target("RoleBinding", &binding.metadata)?;
    if binding.role_ref.name.is_empty() {
        return Err(KubeError::InvalidObject(
            "RoleBinding has no roleRef.name".to_string(),
        ));
    }
    let mut object = binding.clone();
    fill_type_meta(
        &mut object.api_version,
        &mut object.kind,
        RBAC_API_VERSION,
        "RoleBinding",
    );
    let path = paths::role_bindings(namespace)?;
    info!(
        "Creating RoleBinding {}/{} -> {} {}",
        namespace, name, object.role_ref.kind, object.role_ref.name
    );
    write(api, Method::POST, &path, &object).await
}

pub async fn delete_role_binding<A: KubernetesApi + ?Sized>(
    api: &A,
    namespace: &str,
    name: &str,
) -> Result<Value, KubeError> {
    let path = paths::role_binding(namespace, name)?;
    info!("Deleting RoleBinding {}/{}", namespace, name);
    api.request(Method::DELETE, &path, None).await
}

// Discovery

/// Every API group except the core group
pub async fn list_api_groups<A: KubernetesApi + ?Sized>(
    api: &A,
) -> Result<Vec<APIGroup>, KubeError> {
    let path = paths::api_groups();
    let value = api.get(&path).await?;
    Ok(decode::<APIGroupList>(&path, value)?.groups)
}

/// Resources served at the group's preferred version
///
/// A group that names no preferred version is read at its first version.
pub async fn list_group_resources<A: KubernetesApi + ?Sized>(
    api: &A,
    group: &APIGroup,
) -> Result<Vec<APIResource>, KubeError> {
    let version = group
        .preferred_version
        .as_ref()
        .or_else(|| group.versions.first())
        .ok_or_else(|| {
            KubeError::InvalidObject(format!("API group '{}' lists no versions", group.name))
        })?;
    let path = paths::group_resources(&version.group_version)?;
    let value = api.get(&path).await?;
    Ok(decode::<APIResourceList>(&path, value)?.resources)
}

pub async fn list_core_resources<A: KubernetesApi + ?Sized>(
    api: &A,
) -> Result<Vec<APIResource>, KubeError> {
    let path = paths::core_resources();
    let value = api.get(&path).await?;
    Ok(decode::<APIResourceList>(&path, value)?.resources)
}
