//! # Binding Resolution
//!
//! Finds the roles a service account holds: the bindings naming it as a
//! subject, each joined to the role it references.
//!
//! The binding list is fetched first and filtered; the role list is fetched
//! only after that, so a failed binding fetch never reaches the roles.
//!
//! A binding whose role does not exist produces no result. The drop is logged
//! and counted but not reported to the caller.

use tracing::{debug, warn};

use crate::kubernetes::{resources, KubeError, KubernetesApi};
use crate::observability::metrics;
use crate::rbac::{BoundRole, Role, RoleBinding};

/// Roles bound to the service account `name` in `namespace` through RoleBindings
///
/// # Errors
///
/// Fails when either the binding list or the role list cannot be fetched.
pub async fn resolve_principal_roles<A: KubernetesApi + ?Sized>(
    api: &A,
    name: &str,
    namespace: &str,
) -> Result<Vec<BoundRole>, KubeError> {
    let bindings = resources::list_role_bindings(api, namespace).await?;
    let matching = filter_bindings(bindings, name, Some(namespace));
    debug!(
        "ServiceAccount {}/{} is a subject of {} RoleBindings",
        namespace,
        name,
        matching.len()
    );
    let roles = resources::list_roles(api, namespace).await?;
    Ok(join_roles(matching, &roles))
}

/// Cluster roles bound to the service account `name` through ClusterRoleBindings
///
/// When `namespace` is given the subject's namespace must match as well.
///
/// # Errors
///
/// Fails when either the binding list or the cluster role list cannot be fetched.
pub async fn resolve_principal_cluster_roles<A: KubernetesApi + ?Sized>(
    api: &A,
    name: &str,
    namespace: Option<&str>,
) -> Result<Vec<BoundRole>, KubeError> {
    let bindings = resources::list_cluster_role_bindings(api).await?;
    let matching = filter_bindings(bindings, name, namespace);
    debug!(
        "ServiceAccount {} is a subject of {} ClusterRoleBindings",
        name,
        matching.len()
    );
    let roles = resources::list_cluster_roles(api).await?;
    Ok(join_roles(matching, &roles))
}

/// Keep bindings with a subject that is the given service account
pub fn filter_bindings(
    bindings: Vec<RoleBinding>,
    name: &str,
    namespace: Option<&str>,
) -> Vec<RoleBinding> {
    bindings
        .into_iter()
        .filter(|b| b.references_service_account(name, namespace))
        .collect()
}

/// Pair every binding with each role named by its `roleRef`
pub fn join_roles(bindings: Vec<RoleBinding>, roles: &[Role]) -> Vec<BoundRole> {
    let mut bound = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let before = bound.len();
        bound.extend(
            roles
                .iter()
                .filter(|role| role.metadata.name == binding.role_ref.name)
                .map(|role| BoundRole {
                    role_binding: binding.clone(),
                    role: role.clone(),
                }),
        );
        if bound.len() == before {
            warn!(
                "Binding {} references missing {} {}",
                binding.metadata.name, binding.role_ref.kind, binding.role_ref.name
            );
            metrics::increment_dangling_role_refs();
        }
    }
    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::fake::FakeApi;
    use crate::kubernetes::Method;
    use crate::rbac::{group_rules, service_account_subject, ResourceVerbs, Verb};
    use serde_json::{json, Value};

    const ROLE_BINDINGS: &str = "/apis/rbac.authorization.k8s.io/v1/namespaces/ns1/rolebindings";
    const ROLES: &str = "/apis/rbac.authorization.k8s.io/v1/namespaces/ns1/roles";
    const CLUSTER_ROLE_BINDINGS: &str = "/apis/rbac.authorization.k8s.io/v1/clusterrolebindings";
    const CLUSTER_ROLES: &str = "/apis/rbac.authorization.k8s.io/v1/clusterroles";

    fn binding(name: &str, role: &str, subjects: Value) -> Value {
        json!({
            "metadata": {"name": name, "namespace": "ns1"},
            "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": "Role", "name": role},
            "subjects": subjects
        })
    }

    fn role(name: &str) -> Value {
        json!({
            "metadata": {"name": name, "namespace": "ns1"},
            "rules": [{"apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list"]}]
        })
    }

    fn sa(name: &str, namespace: &str) -> Value {
        json!({"kind": "ServiceAccount", "name": name, "namespace": namespace})
    }

    #[tokio::test]
    async fn test_pod_reader_end_to_end() {
        let api = FakeApi::new()
            .with_get(
                ROLE_BINDINGS,
                json!({"items": [binding("read-pods", "pod-reader", json!([sa("sa1", "ns1")]))]}),
            )
            .with_get(ROLES, json!({"items": [role("pod-reader")]}));

        let bound = resolve_principal_roles(&api, "sa1", "ns1").await.unwrap();
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].role_binding.metadata.name, "read-pods");
        assert_eq!(bound[0].role.metadata.name, "pod-reader");

        let grouped = group_rules(&bound[0].role.rules);
        assert_eq!(grouped.len(), 1);
        assert_eq!(
            grouped[""],
            vec![ResourceVerbs {
                name: "pods".to_string(),
                verbs: vec![Verb::Get, Verb::List]
            }]
        );
    }

    #[tokio::test]
    async fn test_no_matching_subject_yields_empty() {
        let api = FakeApi::new()
            .with_get(
                ROLE_BINDINGS,
                json!({"items": [
                    binding("other-sa", "pod-reader", json!([sa("sa2", "ns1")])),
                    binding("other-ns", "pod-reader", json!([sa("sa1", "ns2")])),
                    binding("user", "pod-reader", json!([{"kind": "User", "name": "sa1"}])),
                    binding("no-subjects", "pod-reader", Value::Null),
                ]}),
            )
            .with_get(ROLES, json!({"items": [role("pod-reader")]}));

        let bound = resolve_principal_roles(&api, "sa1", "ns1").await.unwrap();
        assert!(bound.is_empty());
    }

    #[tokio::test]
    async fn test_dangling_role_ref_is_dropped() {
        let api = FakeApi::new()
            .with_get(
                ROLE_BINDINGS,
                json!({"items": [
                    binding("good", "pod-reader", json!([sa("sa1", "ns1")])),
                    binding("dangling", "gone", json!([sa("sa1", "ns1")])),
                ]}),
            )
            .with_get(ROLES, json!({"items": [role("pod-reader"), role("unused")]}));

        let bound = resolve_principal_roles(&api, "sa1", "ns1").await.unwrap();
        let names: Vec<&str> = bound
            .iter()
            .map(|b| b.role_binding.metadata.name.as_str())
            .collect();
        assert_eq!(names, vec!["good"]);
    }

    #[tokio::test]
    async fn test_role_fetch_failure_fails_resolution() {
        let api = FakeApi::new()
            .with_get(ROLE_BINDINGS, json!({"items": []}))
            .with_error(ROLES, 403, "Forbidden");
        let err = resolve_principal_roles(&api, "sa1", "ns1").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    fn requested_paths(api: &FakeApi) -> Vec<String> {
        api.requests()
            .into_iter()
            .map(|(method, path, _)| {
                assert_eq!(method, Method::GET);
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_bindings_are_fetched_before_roles() {
        let api = FakeApi::new()
            .with_get(ROLE_BINDINGS, json!({"items": []}))
            .with_get(ROLES, json!({"items": []}));
        resolve_principal_roles(&api, "sa1", "ns1").await.unwrap();
        assert_eq!(requested_paths(&api), vec![ROLE_BINDINGS, ROLES]);

        let api = FakeApi::new()
            .with_get(CLUSTER_ROLE_BINDINGS, json!({"items": []}))
            .with_get(CLUSTER_ROLES, json!({"items": []}));
        resolve_principal_cluster_roles(&api, "sa1", None).await.unwrap();
        assert_eq!(
            requested_paths(&api),
            vec![CLUSTER_ROLE_BINDINGS, CLUSTER_ROLES]
        );
    }

    #[tokio::test]
    async fn test_binding_fetch_failure_skips_roles() {
        let api = FakeApi::new()
            .with_error(ROLE_BINDINGS, 403, "Forbidden")
            .with_get(ROLES, json!({"items": [role("pod-reader")]}));
        let err = resolve_principal_roles(&api, "sa1", "ns1").await.unwrap_err();
        assert_eq!(err.reason(), "forbidden");
        assert_eq!(requested_paths(&api), vec![ROLE_BINDINGS]);

        let api = FakeApi::new().with_error(CLUSTER_ROLE_BINDINGS, 500, "InternalError");
        let err = resolve_principal_cluster_roles(&api, "sa1", None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(requested_paths(&api), vec![CLUSTER_ROLE_BINDINGS]);
    }

    #[tokio::test]
    async fn test_invalid_namespace_makes_no_request() {
        let api = FakeApi::new();
        let err = resolve_principal_roles(&api, "sa1", "../kube-system")
            .await
            .unwrap_err();
        assert!(matches!(err, KubeError::InvalidName { .. }));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cluster_roles() {
        let api = FakeApi::new()
            .with_get(
                CLUSTER_ROLE_BINDINGS,
                json!({"items": [
                    {
                        "metadata": {"name": "view-all"},
                        "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": "ClusterRole", "name": "view"},
                        "subjects": [sa("sa1", "ns1")]
                    },
                    {
                        "metadata": {"name": "edit-other"},
                        "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": "ClusterRole", "name": "edit"},
                        "subjects": [sa("sa1", "ns2")]
                    }
                ]}),
            )
            .with_get(
                CLUSTER_ROLES,
                json!({"items": [
                    {"metadata": {"name": "view"}, "rules": [{"apiGroups": ["*"], "resources": ["*"], "verbs": ["get"]}]},
                    {"metadata": {"name": "edit"}, "rules": []}
                ]}),
            );

        let all = resolve_principal_cluster_roles(&api, "sa1", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let scoped = resolve_principal_cluster_roles(&api, "sa1", Some("ns1"))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].role.metadata.name, "view");
        assert_eq!(scoped[0].role.metadata.namespace, None);
    }

    #[test]
    fn test_filter_keeps_binding_with_any_matching_subject() {
        let mut b = RoleBinding::for_service_account("b", "ns1", "sa2", "r");
        b.subjects.push(service_account_subject("sa1", "ns1"));
        let kept = filter_bindings(vec![b], "sa1", Some("ns1"));
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_join_preserves_binding_order() {
        let bindings = vec![
            RoleBinding::for_service_account("b2", "ns1", "sa1", "writer"),
            RoleBinding::for_service_account("b1", "ns1", "sa1", "reader"),
        ];
        let roles = vec![Role::new("ns1", "reader"), Role::new("ns1", "writer")];
        let bound = join_roles(bindings, &roles);
        let pairs: Vec<(&str, &str)> = bound
            .iter()
            .map(|b| (b.role_binding.metadata.name.as_str(), b.role.metadata.name.as_str()))
            .collect();
        assert_eq!(pairs, vec![("b2", "writer"), ("b1", "reader")]);
    }
}
