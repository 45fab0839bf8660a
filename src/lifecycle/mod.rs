//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Freeze routes → Build middleware → Bind listener → Serve
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Interrupt / trigger → Stop accepting → Drain in-flight (bounded) → Exit
//! ```
//!
//! # States
//! ```text
//! Configured → Listening → ShuttingDown → Stopped
//!                        ↘ Stopped (non-graceful, or the listener failed)
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{LifecycleError, LifecycleManager};

/// Where a server is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Configured,
    Listening,
    ShuttingDown,
    Stopped,
}
