//! # RBAC Verbs
//!
//! The actions a rule can grant on a resource kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RBAC verb
///
/// Serialized as the plain lowercase string Kubernetes uses. Verbs outside
/// the standard set (`bind`, `escalate`, `use`, ...) appear in discovery
/// documents and some rules; they are kept verbatim in [`Verb::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verb {
    Get,
    List,
    Watch,
    Create,
    Update,
    Patch,
    Delete,
    DeleteCollection,
    /// `*`: every verb
    All,
    Other(String),
}

/// The concrete verbs a wildcard stands for, in display order
pub const CONCRETE_VERBS: [Verb; 8] = [
    Verb::Get,
    Verb::List,
    Verb::Watch,
    Verb::Create,
    Verb::Update,
    Verb::Patch,
    Verb::Delete,
    Verb::DeleteCollection,
];

impl Verb {
    pub fn as_str(&self) -> &str {
        match self {
            Verb::Get => "get",
            Verb::List => "list",
            Verb::Watch => "watch",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
            Verb::DeleteCollection => "deletecollection",
            Verb::All => "*",
            Verb::Other(other) => other,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Verb::All)
    }

    /// Help text shown next to a verb when authoring rules
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Verb::Create => Some("Permission to create a new instance of the selected resource"),
            Verb::Get => Some("Permission to get information of one specific instance of a resource"),
            Verb::List => {
                Some("Permission to retrieve a list of all instances of a specific resource")
            }
            Verb::Watch => {
                Some("Permission to watch live changes on instances of a specific resource")
            }
            Verb::Update => Some(
                "Permission to create a replacement of an already existing instance of a specific resource",
            ),
            Verb::Patch => Some(
                "Permission to alter the configuration of an already existing instance of a specific resource",
            ),
            Verb::Delete => Some("Permission to delete instances of a specific resource"),
            Verb::DeleteCollection => {
                Some("Permission to delete collections of instances of a specific resource")
            }
            Verb::All => Some("Every permission on the selected resource"),
            Verb::Other(_) => None,
        }
    }
}

impl From<&str> for Verb {
    fn from(value: &str) -> Self {
        match value {
            "get" => Verb::Get,
            "list" => Verb::List,
            "watch" => Verb::Watch,
            "create" => Verb::Create,
            "update" => Verb::Update,
            "patch" => Verb::Patch,
            "delete" => Verb::Delete,
            "deletecollection" => Verb::DeleteCollection,
            "*" => Verb::All,
            other => Verb::Other(other.to_string()),
        }
    }
}

impl From<String> for Verb {
    fn from(value: String) -> Self {
        match Verb::from(value.as_str()) {
            Verb::Other(_) => Verb::Other(value),
            known => known,
        }
    }
}

impl From<Verb> for String {
    fn from(value: Verb) -> Self {
        match value {
            Verb::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbs a rule effectively grants
///
/// A set containing the wildcard stands for exactly the eight concrete verbs;
/// any other set is returned as stored.
pub fn effective_verbs(verbs: &[Verb]) -> Vec<Verb> {
    if verbs.iter().any(Verb::is_wildcard) {
        CONCRETE_VERBS.to_vec()
    } else {
        verbs.to_vec()
    }
}
