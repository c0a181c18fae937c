//! # Role Authoring
//!
//! Operations used while composing a role and binding it to a service account.

use serde_json::Map;

use super::types::{Metadata, PolicyRule, Role, RoleBinding, RoleRef, Subject};
use super::verb::Verb;
use crate::constants::{RBAC_API_GROUP, RBAC_API_VERSION, SERVICE_ACCOUNT_KIND};

impl Role {
    /// An empty namespaced role
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: Some(RBAC_API_VERSION.to_string()),
            kind: Some("Role".to_string()),
            metadata: Metadata::namespaced(namespace, name),
            rules: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Append a rule granting `verbs` on one resource of one API group
    pub fn add_rule(
        &mut self,
        api_group: impl Into<String>,
        resource: impl Into<String>,
        verbs: Vec<Verb>,
    ) -> &mut Self {
        self.rules.push(PolicyRule {
            api_groups: Some(vec![api_group.into()]),
            resources: Some(vec![resource.into()]),
            verbs: verbs.into_iter().map(String::from).collect(),
            ..PolicyRule::default()
        });
        self
    }

    /// Remove the rule at `index`
    pub fn remove_rule(&mut self, index: usize) -> Option<PolicyRule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    /// Remove one verb from a rule
    ///
    /// A rule left without verbs grants nothing and is removed entirely.
    /// Returns `false` when the rule or verb does not exist.
    pub fn remove_verb(&mut self, rule_index: usize, verb: &Verb) -> bool {
        let Some(rule) = self.rules.get_mut(rule_index) else {
            return false;
        };
        let before = rule.verbs.len();
        rule.verbs.retain(|v| Verb::from(v.as_str()) != *verb);
        if rule.verbs.len() == before {
            return false;
        }
        if rule.verbs.is_empty() {
            self.rules.remove(rule_index);
        }
        true
    }
}

/// A `ServiceAccount` subject
pub fn service_account_subject(name: impl Into<String>, namespace: impl Into<String>) -> Subject {
    Subject {
        kind: SERVICE_ACCOUNT_KIND.to_string(),
        name: name.into(),
        namespace: Some(namespace.into()),
        api_group: None,
    }
}

/// Whether `subject` is the service account `name`
///
/// `default_namespace` stands in for a missing subject namespace, which
/// the API server resolves to the binding's own namespace. When
/// `namespace` is `None` only kind and name are compared.
pub fn is_service_account(
    subject: &Subject,
    name: &str,
    namespace: Option<&str>,
    default_namespace: Option<&str>,
) -> bool {
    if subject.kind != SERVICE_ACCOUNT_KIND || subject.name != name {
        return false;
    }
    match namespace {
        None => true,
        Some(wanted) => subject.namespace.as_deref().or(default_namespace) == Some(wanted),
    }
}

impl RoleBinding {
    /// Bind the namespaced role `role_name` to a service account of the same namespace
    pub fn for_service_account(
        binding_name: impl Into<String>,
        namespace: impl Into<String>,
        service_account: impl Into<String>,
        role_name: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        Self {
            api_version: Some(RBAC_API_VERSION.to_string()),
            kind: Some("RoleBinding".to_string()),
            metadata: Metadata::namespaced(namespace.clone(), binding_name),
            role_ref: RoleRef {
                api_group: RBAC_API_GROUP.to_string(),
                kind: "Role".to_string(),
                name: role_name.into(),
            },
            subjects: vec![service_account_subject(service_account, namespace)],
            extra: Map::new(),
        }
    }

    /// Whether any subject is the given service account
    pub fn references_service_account(&self, name: &str, namespace: Option<&str>) -> bool {
        let own_namespace = self.metadata.namespace.as_deref();
        self.subjects
            .iter()
            .any(|s| is_service_account(s, name, namespace, own_namespace))
    }
}
