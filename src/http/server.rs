//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the route table into a `Dispatcher`
//! - Mount the dispatcher as the single fallback service of an Axum `Router`
//! - Wire up middleware (request ID, tracing, CORS, timeout)
//!
//! # Layer Order (outermost first)
//! ```text
//! SetRequestId → Trace → Cors → Timeout → PropagateRequestId → Dispatcher
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::dispatcher::{dispatch_handler, Dispatcher};
use crate::http::middleware::cors::{cors_layer, CorsError};
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::http::Collaborators;
use crate::routing::{RouteError, RouteTable};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("invalid cors configuration: {0}")]
    Cors(#[from] CorsError),
}

/// The dispatcher wrapped in its middleware stack, ready to serve.
pub struct HttpServer {
    router: Router,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Build the server from a frozen route table.
    pub fn new(table: RouteTable, config: &AppConfig) -> Result<Self, ServerError> {
        let collaborators = Collaborators::from_config(config);
        let dispatcher = Arc::new(Dispatcher::new(table, collaborators)?);
        let router = Self::build_router(config, Arc::clone(&dispatcher))?;
        Ok(Self { router, dispatcher })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, dispatcher: Arc<Dispatcher>) -> Result<Router, ServerError> {
        let mut router = Router::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID));

        if config.server.request_timeout_secs > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )));
        }

        if let Some(cors) = cors_layer(&config.cors)? {
            router = router.layer(cors);
        }

        Ok(router
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId)))
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// The Axum router, for serving or for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
