//! # RBAC Object Types
//!
//! Envelopes for the Kubernetes objects the console reads and writes.
//!
//! Rules, role references, subjects and discovery documents are the
//! `k8s-openapi` types. The object envelopes are local: their metadata names
//! `name` and `namespace` and keeps every other field the API server returns
//! in a flattened `extra` map, so objects survive a read-modify-write cycle
//! unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub use k8s_openapi::api::rbac::v1::{PolicyRule, RoleRef, Subject};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    APIGroup, APIGroupList, APIResource, APIResourceList, GroupVersionForDiscovery,
};

/// Treat an explicit `null` list like a missing one
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Object metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// labels, annotations, uid, resourceVersion, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            extra: Map::new(),
        }
    }
}

/// A `v1/ServiceAccount`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    /// secrets, imagePullSecrets, automountServiceAccountToken
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A `Role` or `ClusterRole`
///
/// The two kinds share a shape; a `Role` carries `metadata.namespace`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rules: Vec<PolicyRule>,
    /// aggregationRule on cluster roles
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type ClusterRole = Role;

/// A `RoleBinding` or `ClusterRoleBinding`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub role_ref: RoleRef,
    /// Absent on bindings whose subjects were all removed
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subjects: Vec<Subject>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type ClusterRoleBinding = RoleBinding;

/// A binding joined with the role it references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundRole {
    pub role_binding: RoleBinding,
    pub role: Role,
}

/// The core group, which `GET /apis` never lists
pub fn core_api_group() -> APIGroup {
    let version = GroupVersionForDiscovery {
        group_version: crate::constants::CORE_API_VERSION.to_string(),
        version: crate::constants::CORE_API_VERSION.to_string(),
    };
    APIGroup {
        name: String::new(),
        versions: vec![version.clone()],
        preferred_version: Some(version),
        ..APIGroup::default()
    }
}

/// `{items: [...]}` list envelope
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ObjectList<T> {
    #[serde(default = "Option::default")]
    pub items: Option<Vec<T>>,
}
