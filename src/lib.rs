//! RBAC Manager Library
//!
//! Core of the RBAC administration console: API catalog discovery, service
//! account role resolution, rule grouping, and the Kubernetes API plumbing
//! and HTTP routes around them.

pub mod bindings;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod kubernetes;
pub mod observability;
pub mod rbac;
pub mod runtime;
pub mod server;

// Re-export the main entry points for convenience
pub use bindings::{resolve_principal_cluster_roles, resolve_principal_roles};
pub use catalog::{list_all_resource_types, ApiGrouping};
pub use config::KubeConfig;
pub use kubernetes::{KubeClient, KubeError, KubernetesApi};
pub use rbac::{group_rules, GroupedRules};
