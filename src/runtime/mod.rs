//! # Runtime
//!
//! Process startup for the `rbac-manager` server binary.

pub mod initialization;
