//! Application lifecycle tests with real servers.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio_util::sync::CancellationToken;

use service_scaffold::cron::{CronManager, CronServer};
use service_scaffold::lifecycle::{AppError, LifecycleState};
use service_scaffold::{wire, Application};

mod common;

#[tokio::test]
async fn test_serves_until_parent_cancelled() {
    let config = common::test_config();
    let business = Arc::new(ArcSwap::from_pointee(config.business.clone()));
    let server = Arc::new(wire::initialize_api(
        &config,
        wire::provide_user_repository(),
        business,
    ));

    let app = Arc::new(Application::new("lifecycle-test"));
    app.add_server(Arc::clone(&server));
    app.add_server(CronServer::new(Arc::new(CronManager::new())));
    assert_eq!(app.server_count(), 2);

    let parent = CancellationToken::new();
    let running = tokio::spawn({
        let app = Arc::clone(&app);
        let parent = parent.clone();
        async move { app.run(parent).await }
    });

    let addr = common::wait_for_addr(&server).await;
    let body = reqwest::get(format!("http://{addr}/healthcheck/ping"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "pong");
    assert_eq!(app.state(), LifecycleState::Running);

    parent.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(app.state(), LifecycleState::Stopped);

    assert!(reqwest::get(format!("http://{addr}/healthcheck/ping"))
        .await
        .is_err());
}

#[tokio::test]
async fn test_bind_failure_fails_run() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = common::test_config();
    config.http.bind_address = occupied.local_addr().unwrap().to_string();

    let business = Arc::new(ArcSwap::from_pointee(config.business.clone()));
    let app = Application::new("bind-test");
    app.add_server(wire::initialize_api(
        &config,
        wire::provide_user_repository(),
        business,
    ));
    app.add_server(CronServer::new(Arc::new(CronManager::new())));

    let result = tokio::time::timeout(Duration::from_secs(5), app.run(CancellationToken::new()))
        .await
        .unwrap();
    match result {
        Err(AppError::Startup { server, .. }) => assert_eq!(server, "http"),
        other => panic!("expected startup error, got {other:?}"),
    }
    assert_eq!(app.state(), LifecycleState::Stopped);
}
