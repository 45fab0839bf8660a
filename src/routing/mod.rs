//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     RouterGroup::new()
//!     → group() / handle() / get() / crud() (prefix + inherited handlers baked in)
//!     → into_table() → RouteTable (frozen)
//!     → matcher.rs compiles paths
//!
//! Incoming Request (method, path)
//!     → matcher.rs (path lookup, method filter)
//!     → Return: RouteEntry + path variables, or NotFound / MethodNotAllowed
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First registration wins for duplicate (method, path) pairs

pub mod handler;
pub mod matcher;
pub mod router;
pub mod table;

pub use handler::{handler, HandlerChain, HandlerFunc};
pub use matcher::{PathMatcher, Resolution, RouteError};
pub use router::RouterGroup;
pub use table::{RouteEntry, RouteTable};
