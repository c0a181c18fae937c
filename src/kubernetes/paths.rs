//! # API Paths
//!
//! Kubernetes REST paths used by the console, in one place so the client,
//! the server routes and the tests agree on them.
//!
//! Namespaces and names usually arrive from HTTP callers. Every segment is
//! validated before it is pasted into a path, so a value such as
//! `../../api/v1/secrets` cannot steer a request to another resource.

use regex::Regex;
use std::sync::LazyLock;

use super::KubeError;
use crate::constants::{CORE_API_VERSION, RBAC_API_VERSION};

/// RFC 1123 label, the format of namespace names
static DNS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

/// Object names. Wider than a DNS subdomain so that roles such as
/// `system:controller:job-controller` are addressable.
static OBJECT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_.:@]*[A-Za-z0-9])?$").expect("valid regex")
});

/// `v1`, `apps/v1`, `rbac.authorization.k8s.io/v1beta1`
static GROUP_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]([-a-z0-9.]*[a-z0-9])?/)?[a-z0-9]+$").expect("valid regex")
});

const MAX_NAMESPACE_LEN: usize = 63;
const MAX_NAME_LEN: usize = 253;

/// Check a namespace before it becomes a path segment
///
/// # Errors
///
/// Returns [`KubeError::InvalidName`] unless `namespace` is an RFC 1123 label.
pub fn validate_namespace(namespace: &str) -> Result<&str, KubeError> {
    if namespace.len() <= MAX_NAMESPACE_LEN && DNS_LABEL.is_match(namespace) {
        Ok(namespace)
    } else {
        Err(KubeError::InvalidName {
            field: "namespace",
            value: namespace.to_string(),
            constraint: "must be a lowercase RFC 1123 label",
        })
    }
}

/// Check an object name before it becomes a path segment
///
/// # Errors
///
/// Returns [`KubeError::InvalidName`] for empty names, `.` and `..`, and
/// names carrying `/`, `%`, `?`, `#` or whitespace.
pub fn validate_name(name: &str) -> Result<&str, KubeError> {
    if name.len() <= MAX_NAME_LEN && OBJECT_NAME.is_match(name) {
        Ok(name)
    } else {
        Err(KubeError::InvalidName {
            field: "name",
            value: name.to_string(),
            constraint: "must be alphanumeric with '-', '.', '_', ':' or '@' inside",
        })
    }
}

fn validate_group_version(group_version: &str) -> Result<&str, KubeError> {
    if GROUP_VERSION.is_match(group_version) {
        Ok(group_version)
    } else {
        Err(KubeError::InvalidName {
            field: "groupVersion",
            value: group_version.to_string(),
            constraint: "must look like 'v1' or 'group/v1'",
        })
    }
}

pub fn service_accounts(namespace: Option<&str>) -> Result<String, KubeError> {
    Ok(match namespace {
        Some(ns) => format!(
            "/api/{CORE_API_VERSION}/namespaces/{}/serviceaccounts",
            validate_namespace(ns)?
        ),
        None => format!("/api/{CORE_API_VERSION}/serviceaccounts"),
    })
}

pub fn service_account(namespace: &str, name: &str) -> Result<String, KubeError> {
    Ok(format!(
        "{}/{}",
        service_accounts(Some(namespace))?,
        validate_name(name)?
    ))
}

pub fn roles(namespace: &str) -> Result<String, KubeError> {
    Ok(format!(
        "/apis/{RBAC_API_VERSION}/namespaces/{}/roles",
        validate_namespace(namespace)?
    ))
}

pub fn role(namespace: &str, name: &str) -> Result<String, KubeError> {
    Ok(format!("{}/{}", roles(namespace)?, validate_name(name)?))
}

pub fn cluster_roles() -> String {
    format!("/apis/{RBAC_API_VERSION}/clusterroles")
}

pub fn role_bindings(namespace: &str) -> Result<String, KubeError> {
    Ok(format!(
        "/apis/{RBAC_API_VERSION}/namespaces/{}/rolebindings",
        validate_namespace(namespace)?
    ))
}

pub fn role_binding(namespace: &str, name: &str) -> Result<String, KubeError> {
    Ok(format!("{}/{}", role_bindings(namespace)?, validate_name(name)?))
}

pub fn cluster_role_bindings() -> String {
    format!("/apis/{RBAC_API_VERSION}/clusterrolebindings")
}

/// Discovery: every non-core API group
pub fn api_groups() -> String {
    "/apis".to_string()
}

/// Discovery: resources of one group version, e.g. `apps/v1`
pub fn group_resources(group_version: &str) -> Result<String, KubeError> {
    Ok(format!("/apis/{}", validate_group_version(group_version)?))
}

/// Discovery: resources of the core group
pub fn core_resources() -> String {
    format!("/api/{CORE_API_VERSION}")
}
