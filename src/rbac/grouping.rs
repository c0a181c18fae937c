//! # Rule Grouping
//!
//! Regroups a role's rules by API group for display.
//!
//! A rule naming several API groups contributes its resources to every one of
//! them, so the grouped view can list the same resource under more than one
//! group. Order inside a group follows rule order, then resource order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::PolicyRule;
use super::verb::{effective_verbs, Verb};
use crate::constants::CORE_GROUP_LABEL;

/// A resource and the verbs one rule grants on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceVerbs {
    pub name: String,
    /// Verbs as stored on the rule; see [`ResourceVerbs::effective_verbs`]
    pub verbs: Vec<Verb>,
}

impl ResourceVerbs {
    pub fn effective_verbs(&self) -> Vec<Verb> {
        effective_verbs(&self.verbs)
    }
}

/// API group name to the resource entries granted under it
///
/// The core group is keyed by the empty string.
pub type GroupedRules = BTreeMap<String, Vec<ResourceVerbs>>;

/// Group resource-level permissions of `rules` by API group
///
/// Rules without `apiGroups` or `resources` (non-resource URL rules) add
/// nothing.
pub fn group_rules(rules: &[PolicyRule]) -> GroupedRules {
    let mut groups = GroupedRules::new();
    for rule in rules {
        let verbs: Vec<Verb> = rule.verbs.iter().map(|v| Verb::from(v.as_str())).collect();
        let resources: Vec<ResourceVerbs> = rule
            .resources
            .iter()
            .flatten()
            .map(|name| ResourceVerbs {
                name: name.clone(),
                verbs: verbs.clone(),
            })
            .collect();
        for api_group in rule.api_groups.iter().flatten() {
            groups
                .entry(api_group.clone())
                .or_default()
                .extend(resources.iter().cloned());
        }
    }
    groups
}

/// Label for an API group name, rendering the core group as `core`
pub fn group_display_name(api_group: &str) -> &str {
    if api_group.is_empty() {
        CORE_GROUP_LABEL
    } else {
        api_group
    }
}
