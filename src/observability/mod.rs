//! # Observability
//!
//! Prometheus metrics. Logging is configured in `runtime::initialization`.

pub mod metrics;
