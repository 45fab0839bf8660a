//! Serve / shutdown lifecycle tests against a real listener.

use std::time::Duration;

use tokio::net::TcpListener;

use switchyard::config::AppConfig;
use switchyard::{LifecycleError, LifecycleManager, LifecycleState, RouterGroup};

mod common;

fn routes() -> RouterGroup {
    let mut router = RouterGroup::new();
    router.get("/hello", vec![common::text("hello")]);
    router.get("/slow", vec![common::slow(Duration::from_millis(400))]);
    router.get("/stuck", vec![common::slow(Duration::from_secs(30))]);
    router
}

#[tokio::test]
async fn test_graceful_stop_with_no_requests() {
    let server = common::start_server(routes(), true, Duration::from_secs(5)).await;
    let client = common::client();

    let res = client.get(server.url("/hello")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "hello");

    server.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok(), "unexpected error: {:?}", result);
    assert_eq!(*server.state.borrow(), LifecycleState::Stopped);
}

#[tokio::test]
async fn test_in_flight_request_completes_during_drain() {
    let server = common::start_server(routes(), true, Duration::from_secs(5)).await;
    let client = common::client();

    let url = server.url("/slow");
    let pending = tokio::spawn(async move { client.get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown.trigger();

    let res = pending.await.unwrap().unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "slow");

    let result = tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_drain_window_elapses_with_stuck_request() {
    let drain = Duration::from_millis(200);
    let server = common::start_server(routes(), true, drain).await;
    let client = common::client();

    let url = server.url("/stuck");
    let _pending = tokio::spawn(async move { client.get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .expect("drain window was not enforced")
        .unwrap();

    match result {
        Err(LifecycleError::ShutdownTimeout(d)) => assert_eq!(d, drain),
        other => panic!("expected ShutdownTimeout, got {:?}", other),
    }
    assert_eq!(*server.state.borrow(), LifecycleState::Stopped);
}

#[tokio::test]
async fn test_new_connections_refused_after_shutdown() {
    let server = common::start_server(routes(), true, Duration::from_secs(5)).await;
    let url = server.url("/hello");

    server.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    let res = common::client().get(url).send().await;
    assert!(res.is_err(), "listener still accepting: {:?}", res);
}

#[tokio::test]
async fn test_listener_closed_while_draining() {
    let drain = Duration::from_secs(2);
    let server = common::start_server(routes(), true, drain).await;
    let client = common::client();

    let url = server.url("/stuck");
    let _pending = tokio::spawn(async move { client.get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*server.state.borrow(), LifecycleState::ShuttingDown);

    let res = common::client().get(server.url("/hello")).send().await;
    let err = res.expect_err("accepted a connection while draining");
    assert!(err.is_connect(), "expected a refused connection, got {:?}", err);

    let result = tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .expect("drain window was not enforced")
        .unwrap();
    assert!(matches!(result, Err(LifecycleError::ShutdownTimeout(d)) if d == drain));
}

#[tokio::test]
async fn test_state_transitions_through_shutdown() {
    let manager = LifecycleManager::new(routes(), AppConfig::default())
        .with_drain_timeout(Duration::from_secs(5));
    let mut state = manager.state();
    assert_eq!(*state.borrow(), LifecycleState::Configured);

    let shutdown = manager.shutdown_handle();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let task = tokio::spawn(manager.serve(listener, true));

    state.wait_for(|s| *s == LifecycleState::Listening).await.unwrap();
    shutdown.trigger();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == LifecycleState::Stopped),
    )
    .await
    .expect("never reached Stopped")
    .unwrap();

    assert!(task.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_non_graceful_mode_ignores_shutdown_trigger() {
    let server = common::start_server(routes(), false, Duration::from_secs(5)).await;

    server.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let res = common::client().get(server.url("/hello")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(*server.state.borrow(), LifecycleState::Listening);
    assert!(!server.task.is_finished());

    server.task.abort();
}

#[tokio::test]
async fn test_bind_failure_is_returned() {
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let mut config = AppConfig::default();
    config.server.host = "127.0.0.1".to_string();

    for graceful in [true, false] {
        let result = LifecycleManager::new(routes(), config.clone())
            .run(port, graceful)
            .await;
        assert!(
            matches!(result, Err(LifecycleError::Bind(_))),
            "graceful={}: {:?}",
            graceful,
            result
        );
    }
}
