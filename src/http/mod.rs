//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → dispatcher.rs (route lookup, context creation)
//!     → context.rs (per-request state handed to each handler)
//!     → response.rs (staged response or translated failure)
//!     → Send to client
//! ```

pub mod bind;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod middleware;
pub mod render;
pub mod request;
pub mod response;
pub mod server;

pub use context::Context;
pub use dispatcher::Dispatcher;
pub use error::{HandlerError, HandlerResult, HttpError};
pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServerError};

use crate::config::{AppConfig, BindConfig, RenderConfig};

/// Collaborator settings built once at startup and shared with every context.
#[derive(Debug, Clone, Default)]
pub struct Collaborators {
    pub render: RenderConfig,
    pub bind: BindConfig,
}

impl Collaborators {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            render: config.render.clone(),
            bind: config.bind.clone(),
        }
    }
}
