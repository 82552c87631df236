//! Tests for the Telegram channel module.

use super::types::*;
use super::send::is_entity_error;
use super::{parse_update, TelegramChannel};
use suitcast_core::config::TelegramConfig;

fn update(json: &str) -> TgUpdate {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_tg_chat_type_defaults_when_missing() {
    let chat: TgChat = serde_json::from_str(r#"{"id": 123}"#).unwrap();
    assert_eq!(chat.chat_type, "");
}

#[test]
fn test_tg_response_error() {
    let resp: TgResponse<TgSentMessage> = serde_json::from_str(
        r#"{"ok": false, "description": "Bad Request: chat not found"}"#,
    )
    .unwrap();
    assert!(!resp.ok);
    assert!(resp.result.is_none());
    assert_eq!(
        resp.description.as_deref(),
        Some("Bad Request: chat not found")
    );
}

#[test]
fn test_tg_sent_message_ignores_extra_fields() {
    let resp: TgResponse<TgSentMessage> = serde_json::from_str(
        r#"{"ok": true, "result": {"message_id": 42, "chat": {"id": -100, "type": "channel"}, "date": 0, "text": "x"}}"#,
    )
    .unwrap();
    assert_eq!(resp.result.unwrap().message_id, 42);
}

#[test]
fn test_parse_channel_post() {
    let inbound = parse_update(update(
        r##"{
            "update_id": 10,
            "channel_post": {
                "message_id": 5,
                "chat": {"id": -1002682552255, "type": "channel"},
                "text": "#n744 (♠️♥️♦️)"
            }
        }"##,
    ))
    .unwrap();
    assert_eq!(inbound.update_id, 10);
    assert!(!inbound.is_edit);
    assert_eq!(inbound.source_chat_id, Some(-1002682552255));
    assert_eq!(inbound.chat_id, -1002682552255);
    assert_eq!(inbound.chat_type, "channel");
    assert_eq!(inbound.message_id, 5);
    assert_eq!(inbound.sender_user_id, None);
    assert_eq!(inbound.text, "#n744 (♠️♥️♦️)");
}

#[test]
fn test_parse_edited_channel_post() {
    let inbound = parse_update(update(
        r##"{
            "update_id": 11,
            "edited_channel_post": {
                "message_id": 5,
                "chat": {"id": -1002682552255, "type": "channel"},
                "text": "#n744 (♠️♥️♦️) ✅"
            }
        }"##,
    ))
    .unwrap();
    assert!(inbound.is_edit);
}

#[test]
fn test_parse_group_message_uses_sender_chat() {
    let inbound = parse_update(update(
        r##"{
            "update_id": 12,
            "edited_message": {
                "message_id": 9,
                "chat": {"id": -1009, "type": "supergroup"},
                "sender_chat": {"id": -1002682552255, "type": "channel"},
                "text": "#n745 (♠️♥️♦️) ✅"
            }
        }"##,
    ))
    .unwrap();
    assert!(inbound.is_edit);
    assert_eq!(inbound.chat_id, -1009);
    assert_eq!(inbound.source_chat_id, Some(-1002682552255));
}

#[test]
fn test_parse_private_message_has_no_source_chat() {
    let inbound = parse_update(update(
        r#"{
            "update_id": 13,
            "message": {
                "message_id": 1,
                "from": {"id": 777, "username": "op"},
                "chat": {"id": 777, "type": "private"},
                "text": "/status"
            }
        }"#,
    ))
    .unwrap();
    assert_eq!(inbound.source_chat_id, None);
    assert_eq!(inbound.sender_user_id, Some(777));
    assert!(inbound.is_command());
}

#[test]
fn test_parse_caption_as_text() {
    let inbound = parse_update(update(
        r##"{
            "update_id": 14,
            "channel_post": {
                "message_id": 2,
                "chat": {"id": -100, "type": "channel"},
                "caption": "#n12 (♣️)"
            }
        }"##,
    ))
    .unwrap();
    assert_eq!(inbound.text, "#n12 (♣️)");
}

#[test]
fn test_parse_skips_textless_and_unknown_updates() {
    assert!(parse_update(update(
        r#"{"update_id": 15, "channel_post": {"message_id": 3, "chat": {"id": -100, "type": "channel"}}}"#
    ))
    .is_none());
    assert!(parse_update(update(r#"{"update_id": 16, "my_chat_member": {}}"#)).is_none());
}

#[test]
fn test_new_builds_base_url() {
    let config = TelegramConfig {
        bot_token: "123:abc".to_string(),
        api_base: "http://localhost:8081/".to_string(),
        ..Default::default()
    };
    let channel = TelegramChannel::new(config).unwrap();
    assert_eq!(channel.base_url, "http://localhost:8081/bot123:abc");
}

#[test]
fn test_entity_error_detection() {
    assert!(is_entity_error(
        "telegram sendMessage failed (400 Bad Request): Bad Request: can't parse entities: \
         Unsupported start tag \"chat_id\" at byte offset 42"
    ));
    assert!(!is_entity_error(
        "telegram sendMessage failed (400 Bad Request): Bad Request: chat not found"
    ));
}
