//! Discord REST contract tests.
//!
//! These tests verify the request shapes the adapter sends for direct
//! messages, prompt controls, deletions, interaction replies and command
//! registration.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rollcall::channels::DiscordAdapter;
use rollcall::channels::traits::{
    ChatGateway, InteractionRef, MessageRef, OutboundReply, ReplySink,
};
use rollcall::config::DiscordConfig;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(
    server: &MockServer,
    application_id: Option<&str>,
    guild_id: Option<&str>,
) -> DiscordAdapter {
    DiscordAdapter::new(&DiscordConfig {
        bot_token: "test-token".to_owned(),
        application_id: application_id.map(str::to_owned),
        guild_id: guild_id.map(str::to_owned),
        api_base: server.uri(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Direct messages
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn prompt_opens_dm_and_attaches_controls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/@me/channels"))
        .and(header("Authorization", "Bot test-token"))
        .and(body_partial_json(json!({ "recipient_id": "42" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "dm-42" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/channels/dm-42/messages"))
        .and(body_partial_json(json!({
            "content": "Confirm?",
            "components": [{
                "type": 1,
                "components": [
                    { "type": 2, "custom_id": "rollcall:accept:p-1" },
                    { "type": 2, "custom_id": "rollcall:reject:p-1" }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, None, None);
    let message = adapter
        .send_private("42", OutboundReply::prompt("Confirm?", "p-1"))
        .await
        .unwrap();

    assert_eq!(
        message,
        MessageRef {
            channel_id: "dm-42".to_owned(),
            message_id: "msg-1".to_owned(),
        }
    );
}

#[tokio::test]
async fn dm_channel_is_opened_once_per_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/@me/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "dm-7" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/channels/dm-7/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg" })))
        .expect(2)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, None, None);
    adapter
        .send_private("7", OutboundReply::text("one"))
        .await
        .unwrap();
    adapter
        .send_private("7", OutboundReply::text("two"))
        .await
        .unwrap();
}

#[tokio::test]
async fn failed_send_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/@me/channels"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Missing Access"))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, None, None);
    let err = adapter
        .send_private("9", OutboundReply::text("hello"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("403"));
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt lifecycle and interactions
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_message_hits_message_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/channels/dm-1/messages/msg-1"))
        .and(header("Authorization", "Bot test-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, None, None);
    adapter
        .delete_message(&MessageRef {
            channel_id: "dm-1".to_owned(),
            message_id: "msg-1".to_owned(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn ephemeral_interaction_reply_sets_flag() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/interactions/i-1/tok-1/callback"))
        .and(body_partial_json(json!({
            "type": 4,
            "data": { "content": "Check your direct messages to confirm.", "flags": 64 }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, None, None);
    adapter
        .respond_interaction(
            &InteractionRef {
                id: "i-1".to_owned(),
                token: "tok-1".to_owned(),
            },
            "Check your direct messages to confirm.",
            true,
        )
        .await
        .unwrap();
}

// ────────────────────────────────────────────────────────────────────────────
// Commands and health
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn commands_register_for_configured_guild() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/applications/app-1/guilds/guild-1/commands"))
        .and(body_partial_json(json!([
            { "name": "availability" },
            { "name": "available" },
            { "name": "unavailable" }
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, Some("app-1"), Some("guild-1"));
    adapter.register_commands().await.unwrap();
}

#[tokio::test]
async fn command_registration_needs_application_id() {
    let server = MockServer::start().await;
    let adapter = adapter_for(&server, None, None);
    assert!(adapter.register_commands().await.is_err());
}

#[tokio::test]
async fn health_check_reports_token_validity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, None, None);
    assert!(!adapter.health_check().await.unwrap());
    assert_eq!(adapter.id(), "discord");
}

#[tokio::test]
async fn health_check_accepts_valid_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("Authorization", "Bot test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "bot" })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, None, None);
    assert!(adapter.health_check().await.unwrap());
}
