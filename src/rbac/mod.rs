//! # RBAC Model
//!
//! Kubernetes RBAC object types and the pure operations over them:
//!
//! - `types` - object envelopes plus the `k8s-openapi` rule, subject and discovery types
//! - `verb` - the verb enumeration and wildcard expansion
//! - `grouping` - grouping a role's rules by API group
//! - `editing` - building roles and bindings

mod editing;
pub mod grouping;
pub mod types;
pub mod verb;

pub use editing::{is_service_account, service_account_subject};
pub use grouping::{group_display_name, group_rules, GroupedRules, ResourceVerbs};
pub use types::*;
pub use verb::{effective_verbs, Verb, CONCRETE_VERBS};
