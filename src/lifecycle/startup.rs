//! Startup orchestration and the serve loop.
//!
//! # Responsibilities
//! - Compile routes and middleware before touching the network
//! - Bind the listener and begin accepting traffic
//! - In graceful mode, wait for an interrupt and drain within a deadline
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and returned to the caller
//! - Listeners start last (traffic only when ready)
//! - `run`/`serve` consume the manager, so only one shutdown sequence exists

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot, watch};

use crate::config::AppConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::shutdown_requested;
use crate::lifecycle::LifecycleState;
use crate::net::listener::{self, ListenerError};
use crate::routing::RouterGroup;

/// Errors returned to the embedding program.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Bind(#[from] ListenerError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("in-flight requests did not finish within {0:?}")]
    ShutdownTimeout(Duration),
}

/// Owns the listen / accept / shutdown state machine of one server.
pub struct LifecycleManager {
    router: RouterGroup,
    config: AppConfig,
    drain_timeout: Duration,
    shutdown: Shutdown,
    interrupt: broadcast::Receiver<()>,
    state: watch::Sender<LifecycleState>,
}

impl LifecycleManager {
    pub fn new(router: RouterGroup, config: AppConfig) -> Self {
        let shutdown = Shutdown::new();
        let interrupt = shutdown.subscribe();
        let (state, _) = watch::channel(LifecycleState::Configured);
        Self {
            router,
            drain_timeout: Duration::from_secs(config.server.drain_timeout_secs),
            config,
            shutdown,
            interrupt,
            state,
        }
    }

    /// Override the drain window taken from the config.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Handle that requests shutdown just like an interrupt would.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Observe state transitions.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Bind `{server.host}:{port}` and serve until stopped.
    pub async fn run(self, port: u16, graceful: bool) -> Result<(), LifecycleError> {
        let server = HttpServer::new(self.router.routes().clone(), &self.config)?;
        let listener = listener::bind(&self.config.server.host, port).await?;
        self.serve_with(server, listener, graceful).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener, graceful: bool) -> Result<(), LifecycleError> {
        let server = HttpServer::new(self.router.routes().clone(), &self.config)?;
        self.serve_with(server, listener, graceful).await
    }

    async fn serve_with(
        mut self,
        server: HttpServer,
        listener: TcpListener,
        graceful: bool,
    ) -> Result<(), LifecycleError> {
        let addr = listener.local_addr()?;
        let dispatcher = server.dispatcher().clone();
        let app = server
            .into_router()
            .into_make_service_with_connect_info::<SocketAddr>();

        tracing::info!(address = %addr, graceful, "Application starting on http://{}", addr);
        self.state.send_replace(LifecycleState::Listening);

        if !graceful {
            let result = axum::serve(listener, app).await;
            self.state.send_replace(LifecycleState::Stopped);
            return result.map_err(LifecycleError::from);
        }

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let mut serving = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                })
                .await
        });

        tokio::select! {
            res = &mut serving => {
                self.state.send_replace(LifecycleState::Stopped);
                tracing::warn!("Server stopped before shutdown was requested");
                return res?.map_err(LifecycleError::from);
            }
            _ = shutdown_requested(&mut self.interrupt) => {}
        }

        self.state.send_replace(LifecycleState::ShuttingDown);
        tracing::warn!(
            in_flight = dispatcher.in_flight().active_count(),
            drain_timeout = ?self.drain_timeout,
            "Shutting down server"
        );
        let _ = stop_tx.send(());

        match tokio::time::timeout(self.drain_timeout, &mut serving).await {
            Ok(res) => {
                self.state.send_replace(LifecycleState::Stopped);
                res??;
                tracing::info!("Server exited");
                Ok(())
            }
            Err(_) => {
                serving.abort();
                self.state.send_replace(LifecycleState::Stopped);
                tracing::error!(
                    in_flight = dispatcher.in_flight().active_count(),
                    "Drain window elapsed with requests still in flight"
                );
                Err(LifecycleError::ShutdownTimeout(self.drain_timeout))
            }
        }
    }
}
