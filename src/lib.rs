//! Minimal HTTP request-dispatch layer.
//!
//! Routes are registered through nested [`RouterGroup`]s that accumulate a
//! path prefix and inherited handlers, frozen into a route table, and served
//! by a [`LifecycleManager`] with optional interrupt-driven graceful shutdown.
//!
//! ```no_run
//! use axum::http::StatusCode;
//! use switchyard::{handler, AppConfig, LifecycleManager, RouterGroup};
//!
//! # async fn demo() -> Result<(), switchyard::LifecycleError> {
//! let mut router = RouterGroup::new();
//! router.group("/api", vec![], |api| {
//!     api.get("/ping", vec![handler(|ctx| Box::pin(async move {
//!         ctx.text(StatusCode::OK, "pong");
//!         Ok(())
//!     }))]);
//! });
//! LifecycleManager::new(router, AppConfig::default()).run(8080, true).await
//! # }
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use http::{Context, HandlerError, HandlerResult, HttpError, HttpServer};
pub use lifecycle::{LifecycleError, LifecycleManager, LifecycleState, Shutdown};
pub use routing::{handler, HandlerChain, HandlerFunc, RouteEntry, RouteTable, RouterGroup};
