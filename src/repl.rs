//! Line-oriented front-end for a topic chat session.
//!
//! Stdin lines become composer submissions; session events are rendered as
//! plain text lines on stdout. Logging stays on stderr.

#[cfg(test)]
#[path = "repl_test.rs"]
mod repl_test;

use std::sync::Arc;

use forum_client::{
    ApiClient, AuthContext, BellNotifier, ChatApi, ChatEvent, ChatSession, ClientConfig, NoopNotifier, Notifier,
};
use frames::{ChatMessage, ChatUser, MessageId, TopicId};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::CliError;

const LIKE_USAGE: &str = "usage: /like <message_id>";

/// One parsed stdin line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ChatInput {
    Send(String),
    Like(MessageId),
    Quit,
    Empty,
    Invalid(&'static str),
}

pub(crate) fn parse_chat_line(line: &str) -> ChatInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatInput::Empty;
    }
    if trimmed == "/quit" {
        return ChatInput::Quit;
    }
    let (command, rest) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
    if command == "/like" {
        return match rest.trim().parse() {
            Ok(id) => ChatInput::Like(id),
            Err(_) => ChatInput::Invalid(LIKE_USAGE),
        };
    }
    ChatInput::Send(line.to_owned())
}

pub(crate) fn render_message(message: &ChatMessage, viewer: &ChatUser) -> String {
    let time = message.display_time().unwrap_or("--:--");
    let author = if message.user.id == viewer.id {
        "you"
    } else {
        message.user.username.as_str()
    };
    let likes = match (message.likes, message.liked_by_viewer) {
        (0, _) => String::new(),
        (n, true) => format!("  [+{n}, liked]"),
        (n, false) => format!("  [+{n}]"),
    };
    format!("[{time}] #{} {author}: {}{likes}", message.id, message.text)
}

/// Text to print for `event`, if any.
///
/// Message content comes from the event itself; `viewer` only marks the
/// viewer's own lines.
pub(crate) fn render_event(event: &ChatEvent, viewer: &ChatUser) -> Option<String> {
    match event {
        ChatEvent::StatusChanged(status) => Some(format!("-- {} --", status.label())),
        ChatEvent::HistoryLoaded(log) if log.is_empty() => Some("-- no messages yet --".to_owned()),
        ChatEvent::HistoryLoaded(log) => Some(
            log.iter()
                .map(|m| render_message(m, viewer))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        ChatEvent::MessageAppended(message) => Some(render_message(message, viewer)),
        ChatEvent::LikesChanged {
            message_id,
            likes,
            liked_by_viewer,
        } => {
            let mine = if *liked_by_viewer { ", liked by you" } else { "" };
            Some(format!("-- #{message_id}: {likes} like(s){mine} --"))
        }
        ChatEvent::TypingChanged(names) if names.is_empty() => None,
        ChatEvent::TypingChanged(names) => Some(format!("-- {} typing... --", names.join(", "))),
        ChatEvent::OnlineCount(count) => Some(format!("-- {count} online --")),
        ChatEvent::ScrollToBottom | ChatEvent::MessageCue => None,
    }
}

pub(crate) async fn run_chat(
    config: ClientConfig,
    token: String,
    api: ApiClient,
    topic_id: TopicId,
    quiet: bool,
) -> Result<(), CliError> {
    let viewer: ChatUser = api.current_user().await?.into();
    tracing::info!(topic_id, viewer = %viewer.username, "joining topic chat");

    let auth = AuthContext::new(token, viewer.clone());
    let notifier: Arc<dyn Notifier> = if quiet {
        Arc::new(NoopNotifier)
    } else {
        Arc::new(BellNotifier)
    };
    let api: Arc<dyn ChatApi> = Arc::new(api);
    let session = ChatSession::new(config, auth, api, notifier);
    let mut handle = session.connect(topic_id)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_chat_line(&line) {
                    ChatInput::Send(text) => handle.send(text),
                    ChatInput::Like(message_id) => handle.toggle_like(message_id),
                    ChatInput::Quit => break,
                    ChatInput::Empty => {}
                    ChatInput::Invalid(usage) => eprintln!("{usage}"),
                }
            }
            event = handle.next_event() => {
                let Some(event) = event else { break };
                if let Some(text) = render_event(&event, &viewer) {
                    println!("{text}");
                }
            }
        }
    }

    let topic_id = handle.topic_id();
    handle.close().await;
    tracing::info!(topic_id, "left topic chat");
    Ok(())
}
