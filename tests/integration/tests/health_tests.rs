//! Health endpoint integration tests
//!
//! Run with: cargo test -p integration-tests --test health_tests

use std::sync::Arc;

use integration_tests::{
    assert_json, assert_status, relay_settings, wait_until, world_config, world_frame, FakeWorld,
    TestHealthServer, TestRelay,
};
use relay_bridge::{HealthStats, RelayEvent};
use relay_core::HealthSink;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_health_unavailable_until_both_sides_connect() {
    let stats = Arc::new(HealthStats::new());
    let server = TestHealthServer::start(stats.clone()).await.unwrap();

    let response = server.get("/health").await.unwrap();
    let body: Value = assert_json(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["connections"]["mud"], false);
    assert_eq!(body["connections"]["discord"], false);

    stats.set_world_connected(true);
    stats.set_chat_connected(true);

    let response = server.get("/health").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_other_paths_and_methods_are_not_found() {
    let server = TestHealthServer::start(Arc::new(HealthStats::new()))
        .await
        .unwrap();

    assert_status(server.get("/").await.unwrap(), StatusCode::NOT_FOUND)
        .await
        .unwrap();
    assert_status(server.get("/health/ready").await.unwrap(), StatusCode::NOT_FOUND)
        .await
        .unwrap();
    assert_status(server.post("/health").await.unwrap(), StatusCode::NOT_FOUND)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_health_reflects_running_relay() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let server = TestHealthServer::start(relay.stats.clone()).await.unwrap();
    let mut conn = world.accept().await.unwrap();
    relay.wait_world_connected(true).await.unwrap();

    // World up, chat not ready yet
    assert_status(server.get("/health").await.unwrap(), StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();

    relay
        .event(RelayEvent::ChatReady {
            user: "relay#0001".to_string(),
        })
        .await
        .unwrap();
    wait_until(|| relay.stats.is_healthy())
        .await
        .unwrap();

    conn.send_frame(&world_frame("town", "Alice", "hi", 0))
        .await
        .unwrap();
    wait_until(|| relay.stats.snapshot().messages.mud_to_discord == 1)
        .await
        .unwrap();

    let response = server.get("/health").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["messages"]["mudToDiscord"], 1);
    assert_eq!(body["messages"]["discordToMud"], 0);

    relay.shutdown().await.unwrap();
}
