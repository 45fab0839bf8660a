//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use switchyard::{
    handler, AppConfig, HandlerFunc, LifecycleError, LifecycleManager, LifecycleState,
    RouterGroup, Shutdown,
};

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub state: watch::Receiver<LifecycleState>,
    pub task: JoinHandle<Result<(), LifecycleError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start `router` on `127.0.0.1:0` and wait until it is listening.
pub async fn start_server(router: RouterGroup, graceful: bool, drain: Duration) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let manager = LifecycleManager::new(router, AppConfig::default()).with_drain_timeout(drain);
    let shutdown = manager.shutdown_handle();
    let state = manager.state();
    let task = tokio::spawn(manager.serve(listener, graceful));

    let mut waiting = state.clone();
    tokio::time::timeout(
        Duration::from_secs(5),
        waiting.wait_for(|s| *s == LifecycleState::Listening),
    )
    .await
    .expect("server did not start listening")
    .unwrap();

    TestServer { addr, shutdown, state, task }
}

/// Non-pooled client so each request opens its own connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Handler that writes `body` as plain text.
pub fn text(body: &'static str) -> HandlerFunc {
    handler(move |ctx| {
        Box::pin(async move {
            ctx.text(StatusCode::OK, body);
            Ok(())
        })
    })
}

/// Handler that sleeps before answering.
pub fn slow(delay: Duration) -> HandlerFunc {
    handler(move |ctx| {
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            ctx.text(StatusCode::OK, "slow");
            Ok(())
        })
    })
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
