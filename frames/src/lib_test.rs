use super::*;

fn message_json(id: i64, user_id: i64, username: &str) -> Value {
    serde_json::json!({
        "id": id,
        "topic_id": 7,
        "user": {"id": user_id, "username": username, "avatar_url": null},
        "message": format!("hello from {username}"),
        "created_at": "2025-02-15T18:42:10.123456",
        "likes": 2,
        "liked_by_me": false
    })
}

// =============================================================
// decode_inbound
// =============================================================

#[test]
fn decode_history_keeps_server_order() {
    let text = serde_json::json!({
        "type": "history",
        "messages": [message_json(3, 1, "ana"), message_json(1, 2, "rui")]
    })
    .to_string();

    let InboundFrame::History(messages) = decode_inbound(&text).expect("decode") else {
        panic!("expected history frame");
    };
    let ids: Vec<_> = messages.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert_eq!(messages[1].user.username, "rui");
}

#[test]
fn decode_message_maps_wire_field_names() {
    let text = serde_json::json!({"type": "message", "data": message_json(9, 4, "ines")}).to_string();

    let InboundFrame::Message(msg) = decode_inbound(&text).expect("decode") else {
        panic!("expected message frame");
    };
    assert_eq!(msg.id, 9);
    assert_eq!(msg.topic_id, 7);
    assert_eq!(msg.text, "hello from ines");
    assert_eq!(msg.likes, 2);
    assert!(!msg.liked_by_viewer);
    assert!(msg.user.avatar_url.is_none());
}

#[test]
fn decode_message_defaults_missing_like_fields() {
    let text = serde_json::json!({
        "type": "message",
        "data": {
            "id": 1,
            "topic_id": 2,
            "user": {"id": 3, "username": "z"},
            "message": "x",
            "created_at": "2025-01-01T00:00:00"
        }
    })
    .to_string();

    let InboundFrame::Message(msg) = decode_inbound(&text).expect("decode") else {
        panic!("expected message frame");
    };
    assert_eq!(msg.likes, 0);
    assert!(!msg.liked_by_viewer);
}

#[test]
fn decode_like_update() {
    let text = r#"{"type":"like_update","data":{"message_id":12,"likes":5}}"#;
    assert_eq!(
        decode_inbound(text).expect("decode"),
        InboundFrame::LikeUpdate(LikeUpdate { message_id: 12, likes: 5 })
    );
}

#[test]
fn decode_typing_and_online_count() {
    assert_eq!(
        decode_inbound(r#"{"type":"typing","username":"ana"}"#).expect("decode"),
        InboundFrame::Typing { username: "ana".to_owned() }
    );
    assert_eq!(
        decode_inbound(r#"{"type":"online_count","count":4}"#).expect("decode"),
        InboundFrame::OnlineCount(4)
    );
}

#[test]
fn decode_unknown_kind_is_not_an_error() {
    let frame = decode_inbound(r#"{"type":"reaction","emoji":"x"}"#).expect("decode");
    assert_eq!(frame, InboundFrame::Unknown("reaction".to_owned()));
    assert_eq!(frame.kind(), "reaction");
}

#[test]
fn decode_rejects_non_json_text() {
    let err = decode_inbound("not json").expect_err("should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn decode_rejects_missing_or_non_string_type() {
    assert!(matches!(decode_inbound("{}"), Err(CodecError::MissingType)));
    assert!(matches!(decode_inbound(r#"{"type":3}"#), Err(CodecError::MissingType)));
    assert!(matches!(decode_inbound("[1,2]"), Err(CodecError::MissingType)));
}

#[test]
fn decode_rejects_known_kind_with_bad_payload() {
    let err = decode_inbound(r#"{"type":"history","messages":"nope"}"#).expect_err("should fail");
    assert!(matches!(err, CodecError::InvalidPayload { kind: "history", .. }));

    let err = decode_inbound(r#"{"type":"message"}"#).expect_err("should fail");
    assert!(matches!(err, CodecError::InvalidPayload { kind: "message", .. }));

    let err = decode_inbound(r#"{"type":"online_count","count":-1}"#).expect_err("should fail");
    assert!(matches!(err, CodecError::InvalidPayload { kind: "online_count", .. }));
}

// =============================================================
// encode_outbound
// =============================================================

#[test]
fn outbound_text_is_sent_bare() {
    assert_eq!(encode_outbound(&OutboundFrame::Text("ola".to_owned())), "ola");
}

#[test]
fn outbound_typing_is_tagged_json() {
    let text = encode_outbound(&OutboundFrame::Typing);
    let value: Value = serde_json::from_str(&text).expect("json");
    assert_eq!(value, serde_json::json!({"type": "typing"}));
}

// =============================================================
// Helpers
// =============================================================

#[test]
fn display_time_slices_hours_and_minutes() {
    let msg: ChatMessage = serde_json::from_value(message_json(1, 1, "a")).expect("message");
    assert_eq!(msg.display_time(), Some("18:42"));
}

#[test]
fn display_time_rejects_unexpected_shapes() {
    let mut msg: ChatMessage = serde_json::from_value(message_json(1, 1, "a")).expect("message");
    msg.created_at = "yesterday".to_owned();
    assert_eq!(msg.display_time(), None);
    msg.created_at = "2025-01-01Tab:cd".to_owned();
    assert_eq!(msg.display_time(), None);
}

#[test]
fn avatar_initial_is_uppercased() {
    let user = ChatUser { id: 1, username: "beatriz".to_owned(), avatar_url: None };
    assert_eq!(user.avatar_initial(), Some('B'));
}

#[test]
fn resolved_avatar_url_joins_relative_paths() {
    let mut user = ChatUser {
        id: 1,
        username: "a".to_owned(),
        avatar_url: Some("/static/avatars/1.png".to_owned()),
    };
    assert_eq!(
        user.resolved_avatar_url("http://localhost:8000/").as_deref(),
        Some("http://localhost:8000/static/avatars/1.png")
    );

    user.avatar_url = Some("https://cdn.example.com/a.png".to_owned());
    assert_eq!(
        user.resolved_avatar_url("http://localhost:8000").as_deref(),
        Some("https://cdn.example.com/a.png")
    );

    user.avatar_url = Some(String::new());
    assert_eq!(user.resolved_avatar_url("http://localhost:8000"), None);
}
