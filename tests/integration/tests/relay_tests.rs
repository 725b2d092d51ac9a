//! Relay integration tests
//!
//! Each test runs the relay dispatcher against a fake world server on a free
//! local port and a recording chat gateway.
//!
//! Run with: cargo test -p integration-tests --test relay_tests

use std::time::Duration;

use integration_tests::{
    chat, member, relay_settings, wait_until, world_config, world_frame, FakeWorld, TestRelay,
    GENERAL, OFF_TOPIC, UNMAPPED,
};
use relay_bridge::RelayEvent;
use serde_json::json;

// ============================================================================
// World to chat
// ============================================================================

#[tokio::test]
async fn test_world_speech_reaches_mapped_channel() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let mut conn = world.accept().await.unwrap();
    relay.wait_world_connected(true).await.unwrap();

    conn.send_frame(&world_frame("town", "Alice", "hi", 0))
        .await
        .unwrap();

    let sent = relay.gateway.wait_for_sent(1).await.unwrap();
    assert_eq!(sent, vec![(GENERAL.to_string(), "Alice: hi".to_string())]);
    wait_until(|| relay.stats.snapshot().messages.mud_to_discord == 1)
        .await
        .unwrap();

    relay.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_world_emote_is_sent_verbatim() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let mut conn = world.accept().await.unwrap();

    conn.send_frame(&world_frame("ooc", "Alice", "Alice waves.", 1))
        .await
        .unwrap();

    let sent = relay.gateway.wait_for_sent(1).await.unwrap();
    assert_eq!(sent, vec![(OFF_TOPIC.to_string(), "Alice waves.".to_string())]);

    relay.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_bad_and_unmapped_frames_are_skipped_in_order() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let mut conn = world.accept().await.unwrap();

    conn.send_raw(b"{broken\n").await.unwrap();
    conn.send_frame(&world_frame("guild", "Bo", "secret", 0))
        .await
        .unwrap();
    conn.send_frame(&world_frame("town", "Alice", "one", 0))
        .await
        .unwrap();
    conn.send_frame(&world_frame("town", "Alice", "two", 0))
        .await
        .unwrap();

    let sent = relay.gateway.wait_for_sent(2).await.unwrap();
    assert_eq!(
        sent,
        vec![
            (GENERAL.to_string(), "Alice: one".to_string()),
            (GENERAL.to_string(), "Alice: two".to_string()),
        ]
    );
    assert!(relay.stats.snapshot().connections.mud);

    relay.shutdown().await.unwrap();
}

// ============================================================================
// Chat to world
// ============================================================================

#[tokio::test]
async fn test_chat_message_reaches_world() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let mut conn = world.accept().await.unwrap();
    relay.wait_world_connected(true).await.unwrap();

    relay.chat(chat("Bob", GENERAL, "hello")).await.unwrap();

    assert_eq!(
        conn.read_chat_frame().await.unwrap(),
        json!({"channel": "town", "name": "Bob", "message": "hello"})
    );

    relay.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_mass_mentions_are_neutralized() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let mut conn = world.accept().await.unwrap();
    relay.wait_world_connected(true).await.unwrap();

    relay
        .chat(chat("Bob", GENERAL, "@everyone check this"))
        .await
        .unwrap();

    let frame = conn.read_chat_frame().await.unwrap();
    assert_eq!(frame["message"], "[mention removed] check this");

    relay.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_mentions_and_emoji_are_cleaned() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let mut conn = world.accept().await.unwrap();
    relay.wait_world_connected(true).await.unwrap();

    let message = chat("Bob🔥", OFF_TOPIC, "hey <@42> 👋 <:wave:123456789012345678>")
        .with_mention(member(42, "Carol"));
    relay.chat(message).await.unwrap();

    assert_eq!(
        conn.read_chat_frame().await.unwrap(),
        json!({"channel": "ooc", "name": "Bob", "message": "hey Carol"})
    );

    relay.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_dropped_chat_messages_never_reach_world() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let mut conn = world.accept().await.unwrap();
    relay.wait_world_connected(true).await.unwrap();

    relay.chat(chat("Bob", UNMAPPED, "wrong room")).await.unwrap();
    relay
        .chat(chat("Helper", GENERAL, "beep").from_bot())
        .await
        .unwrap();
    relay.chat(chat("Bob", GENERAL, "🎉")).await.unwrap();
    relay
        .chat(chat("Bob", GENERAL, &"x".repeat(2001)))
        .await
        .unwrap();

    assert!(conn.is_quiet_for(Duration::from_millis(200)).await);
    assert_eq!(relay.stats.snapshot().messages.discord_to_mud, 0);

    relay.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_burst_from_one_author_is_rate_limited() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let mut conn = world.accept().await.unwrap();
    relay.wait_world_connected(true).await.unwrap();

    for n in 0..5 {
        relay
            .chat(chat("Bob", GENERAL, &format!("spam {n}")))
            .await
            .unwrap();
    }
    relay.chat(chat("Dora", GENERAL, "hi")).await.unwrap();

    assert_eq!(conn.read_chat_frame().await.unwrap()["message"], "spam 0");
    assert_eq!(conn.read_chat_frame().await.unwrap()["name"], "Dora");
    assert!(conn.is_quiet_for(Duration::from_millis(50)).await);

    // After the interval the author may speak again
    tokio::time::sleep(Duration::from_millis(120)).await;
    relay.chat(chat("Bob", GENERAL, "again")).await.unwrap();
    assert_eq!(conn.read_chat_frame().await.unwrap()["message"], "again");

    relay.shutdown().await.unwrap();
}

// ============================================================================
// Connection lifecycle
// ============================================================================

#[tokio::test]
async fn test_auth_frame_sent_on_every_connect() {
    let world = FakeWorld::bind().await.unwrap();
    let mut config = world_config(world.port());
    config.auth_token = Some("s3cret".to_string());
    let relay = TestRelay::start(config, relay_settings());

    let mut conn = world.accept().await.unwrap();
    assert_eq!(
        conn.read_frame().await.unwrap(),
        json!({"channel": "auth", "name": "bot", "message": "s3cret"})
    );
    relay.wait_world_connected(true).await.unwrap();

    // Clean close: the relay reconnects and authenticates again
    drop(conn);
    relay.wait_world_connected(false).await.unwrap();

    let mut conn = world.accept().await.unwrap();
    assert_eq!(conn.read_frame().await.unwrap()["channel"], "auth");
    assert!(conn.is_quiet_for(Duration::from_millis(100)).await);

    relay.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_heartbeats_while_connected() {
    let world = FakeWorld::bind().await.unwrap();
    let mut config = world_config(world.port());
    config.heartbeat_interval_ms = 40;
    let relay = TestRelay::start(config, relay_settings());

    let mut conn = world.accept().await.unwrap();
    for _ in 0..3 {
        assert_eq!(
            conn.read_frame().await.unwrap(),
            json!({"channel": "heartbeat", "name": "bot", "message": "ping"})
        );
    }

    relay.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_world_socket() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let mut conn = world.accept().await.unwrap();
    relay.wait_world_connected(true).await.unwrap();

    relay.shutdown().await.unwrap();
    assert!(conn.read_frame().await.is_err());
}

#[tokio::test]
async fn test_chat_ready_looks_up_mapped_channels() {
    let world = FakeWorld::bind().await.unwrap();
    let relay = TestRelay::start(world_config(world.port()), relay_settings());
    let _conn = world.accept().await.unwrap();

    relay
        .event(RelayEvent::ChatReady {
            user: "relay#0001".to_string(),
        })
        .await
        .unwrap();

    wait_until(|| relay.gateway.fetched().len() == 2)
        .await
        .unwrap();
    assert_eq!(relay.gateway.fetched(), vec![GENERAL, OFF_TOPIC]);
    assert!(relay.stats.snapshot().connections.discord);

    relay.shutdown().await.unwrap();
}
