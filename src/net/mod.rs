//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! LifecycleManager::run(port)
//!     → listener.rs (bind host:port)
//!     → axum::serve accept loop (one task per connection)
//!     → Dispatcher (connection.rs tracks each in-flight request)
//! ```
//!
//! # Design Decisions
//! - Bind errors surface before serving starts, in every run mode
//! - In-flight count is diagnostic only; draining is bounded by time

pub mod connection;
pub mod listener;

pub use connection::{InFlightGuard, InFlightTracker};
pub use listener::ListenerError;
