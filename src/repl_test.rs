use forum_client::{ChatState, ChatTuning, ConnectionStatus};

use super::*;

fn viewer() -> ChatUser {
    ChatUser {
        id: 1,
        username: "me".to_owned(),
        avatar_url: None,
    }
}

fn message(id: MessageId, user_id: i64, username: &str, likes: i64, liked: bool) -> ChatMessage {
    ChatMessage {
        id,
        topic_id: 7,
        user: ChatUser {
            id: user_id,
            username: username.to_owned(),
            avatar_url: None,
        },
        text: "boa noite".to_owned(),
        created_at: "2025-03-01T21:30:00".to_owned(),
        likes,
        liked_by_viewer: liked,
    }
}

#[test]
fn parse_plain_line_keeps_text() {
    assert_eq!(parse_chat_line("  olá  "), ChatInput::Send("  olá  ".to_owned()));
}

#[test]
fn parse_commands() {
    assert_eq!(parse_chat_line("/quit"), ChatInput::Quit);
    assert_eq!(parse_chat_line("/like 42"), ChatInput::Like(42));
    assert_eq!(parse_chat_line("/like abc"), ChatInput::Invalid(LIKE_USAGE));
    assert_eq!(parse_chat_line("   "), ChatInput::Empty);
}

#[test]
fn like_command_needs_word_boundary() {
    assert_eq!(
        parse_chat_line("/likes are great"),
        ChatInput::Send("/likes are great".to_owned())
    );
    assert_eq!(parse_chat_line("/like"), ChatInput::Invalid(LIKE_USAGE));
    assert_eq!(parse_chat_line("/like\t7"), ChatInput::Like(7));
}

#[test]
fn render_message_marks_viewer_and_likes() {
    let me = viewer();
    assert_eq!(
        render_message(&message(3, 2, "ana", 0, false), &me),
        "[21:30] #3 ana: boa noite"
    );
    assert_eq!(
        render_message(&message(4, 1, "me", 2, true), &me),
        "[21:30] #4 you: boa noite  [+2, liked]"
    );
}

#[test]
fn render_history_lists_every_loaded_message() {
    let me = viewer();
    assert_eq!(
        render_event(&ChatEvent::HistoryLoaded(Vec::new()), &me).as_deref(),
        Some("-- no messages yet --")
    );

    let log = vec![message(1, 2, "ana", 0, false), message(2, 3, "rui", 1, false)];
    let rendered = render_event(&ChatEvent::HistoryLoaded(log), &me).expect("rendered");
    assert_eq!(rendered.lines().count(), 2);
    assert!(rendered.contains("#2 rui"));
}

#[test]
fn message_after_history_is_printed_once() {
    let me = viewer();
    let mut state = ChatState::new(7, me.clone(), ChatTuning::default());
    state.set_status(ConnectionStatus::Connected);
    let now = std::time::Instant::now();

    // Both frames are applied before the front-end drains either event.
    let mut events = state.apply_frame(
        frames::InboundFrame::History(vec![message(1, 2, "ana", 0, false), message(2, 3, "rui", 0, false)]),
        now,
    );
    events.extend(state.apply_frame(frames::InboundFrame::Message(message(3, 2, "ana", 0, false)), now));

    let printed: Vec<String> = events.iter().filter_map(|e| render_event(e, &me)).collect();
    let lines: Vec<&str> = printed.iter().flat_map(|p| p.lines()).collect();
    assert_eq!(lines.iter().filter(|l| l.contains("#3 ")).count(), 1);
    assert_eq!(lines.len(), 3);
}

#[test]
fn silent_events_render_nothing() {
    let me = viewer();
    assert_eq!(render_event(&ChatEvent::ScrollToBottom, &me), None);
    assert_eq!(render_event(&ChatEvent::MessageCue, &me), None);
    assert_eq!(render_event(&ChatEvent::TypingChanged(Vec::new()), &me), None);
}

#[test]
fn status_and_presence_lines() {
    let me = viewer();
    assert_eq!(
        render_event(&ChatEvent::StatusChanged(ConnectionStatus::Closed), &me).as_deref(),
        Some("-- disconnected --")
    );
    assert_eq!(render_event(&ChatEvent::OnlineCount(3), &me).as_deref(), Some("-- 3 online --"));
    assert_eq!(
        render_event(&ChatEvent::TypingChanged(vec!["ana".to_owned(), "rui".to_owned()]), &me).as_deref(),
        Some("-- ana, rui typing... --")
    );
}
