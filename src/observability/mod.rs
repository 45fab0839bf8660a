//! Logging and request metrics.
//!
//! ```text
//! Dispatcher ──► tracing events ──► logging.rs (EnvFilter + fmt to stdout)
//!            └─► metrics.rs ──► Prometheus exporter (only when enabled)
//! ```
//!
//! - Filter directives come from `RUST_LOG` first, then the config level
//! - Recording a request is a counter increment plus one histogram sample

pub mod logging;
pub mod metrics;
