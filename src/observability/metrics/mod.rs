//! # Metrics Module
//!
//! Prometheus metrics, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and text export
//! - `kube_metrics` - Kubernetes API requests and RBAC resolution metrics

pub mod kube_metrics;
pub mod registry;

pub use kube_metrics::*;
pub use registry::*;
