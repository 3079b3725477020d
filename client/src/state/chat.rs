//! Chat state for one forum topic.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session task owns exactly one `ChatState` per topic connection and is
//! its only mutator. Inbound frames, user commands and timer ticks are applied
//! here and produce [`ChatEvent`]s for the view; outbound frames are returned
//! to the caller, never sent from here.
//!
//! INVARIANTS
//! ==========
//! - The message log is append-only between history loads and keeps arrival
//!   order.
//! - `like_update` frames set the count only; the viewer's liked flag is
//!   owned by the optimistic toggle.
//! - `Closed` is terminal.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::time::Instant;

use frames::{ChatMessage, ChatUser, InboundFrame, LikeUpdate, MessageId, OutboundFrame, TopicId};

use super::typing::{TypingRoster, TypingThrottle};
use super::viewport::{ScrollTrigger, Viewport, should_autoscroll};
use crate::config::ChatTuning;

/// Websocket connection status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Handshake in progress.
    #[default]
    Connecting,
    /// Socket is open.
    Connected,
    /// Socket failed or was closed. Not retried.
    Closed,
}

impl ConnectionStatus {
    /// Short badge text for the chat header.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "connecting...",
            Self::Connected => "connected",
            Self::Closed => "disconnected",
        }
    }
}

/// Discrete change the view should react to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatEvent {
    StatusChanged(ConnectionStatus),
    /// The log was replaced by a history frame; carries the loaded log.
    HistoryLoaded(Vec<ChatMessage>),
    MessageAppended(ChatMessage),
    LikesChanged {
        message_id: MessageId,
        likes: i64,
        liked_by_viewer: bool,
    },
    /// Current roster, in display order.
    TypingChanged(Vec<String>),
    OnlineCount(u32),
    ScrollToBottom,
    /// A message from someone else arrived; play the audible cue.
    MessageCue,
}

#[derive(Clone, Debug)]
pub struct ChatState {
    pub topic_id: TopicId,
    pub viewer: ChatUser,
    pub status: ConnectionStatus,
    pub messages: Vec<ChatMessage>,
    pub typing: TypingRoster,
    pub online_count: u32,
    /// Composer text.
    pub input: String,
    /// Whether the list was within the scroll threshold at the last viewport report.
    pub near_bottom: bool,
    tuning: ChatTuning,
    typing_throttle: TypingThrottle,
}

impl ChatState {
    #[must_use]
    pub fn new(topic_id: TopicId, viewer: ChatUser, tuning: ChatTuning) -> Self {
        Self {
            topic_id,
            viewer,
            status: ConnectionStatus::Connecting,
            messages: Vec::new(),
            typing: TypingRoster::default(),
            online_count: 0,
            input: String::new(),
            near_bottom: true,
            tuning,
            typing_throttle: TypingThrottle::new(tuning.typing_throttle),
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    #[must_use]
    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Move to `status`. Leaving `Closed` is refused.
    pub fn set_status(&mut self, status: ConnectionStatus) -> Option<ChatEvent> {
        if self.status == status || self.status == ConnectionStatus::Closed {
            return None;
        }
        self.status = status;
        Some(ChatEvent::StatusChanged(status))
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Apply one decoded frame from the topic channel.
    pub fn apply_frame(&mut self, frame: InboundFrame, now: Instant) -> Vec<ChatEvent> {
        match frame {
            InboundFrame::History(messages) => self.load_history(messages),
            InboundFrame::Message(message) => self.append_message(message),
            InboundFrame::LikeUpdate(update) => self.apply_like_update(update).into_iter().collect(),
            InboundFrame::Typing { username } => self.observe_typing(&username, now).into_iter().collect(),
            InboundFrame::OnlineCount(count) => {
                self.online_count = count;
                vec![ChatEvent::OnlineCount(count)]
            }
            InboundFrame::Unknown(kind) => {
                tracing::debug!(topic_id = self.topic_id, %kind, "chat: ignoring unknown frame kind");
                Vec::new()
            }
        }
    }

    fn load_history(&mut self, messages: Vec<ChatMessage>) -> Vec<ChatEvent> {
        self.messages = messages;
        let mut events = vec![ChatEvent::HistoryLoaded(self.messages.clone())];
        if should_autoscroll(ScrollTrigger::HistoryLoaded, self.near_bottom) {
            self.near_bottom = true;
            events.push(ChatEvent::ScrollToBottom);
        }
        events
    }

    fn append_message(&mut self, message: ChatMessage) -> Vec<ChatEvent> {
        let was_near_bottom = self.near_bottom;
        let own = message.user.id == self.viewer.id;
        self.messages.push(message.clone());

        let mut events = vec![ChatEvent::MessageAppended(message)];
        if !own {
            events.push(ChatEvent::MessageCue);
        }
        let trigger = if own {
            ScrollTrigger::OwnMessage
        } else {
            ScrollTrigger::PeerMessage
        };
        if should_autoscroll(trigger, was_near_bottom) {
            self.near_bottom = true;
            events.push(ChatEvent::ScrollToBottom);
        }
        events
    }

    fn apply_like_update(&mut self, update: LikeUpdate) -> Option<ChatEvent> {
        let message = self.messages.iter_mut().find(|m| m.id == update.message_id)?;
        message.likes = update.likes;
        Some(ChatEvent::LikesChanged {
            message_id: message.id,
            likes: message.likes,
            liked_by_viewer: message.liked_by_viewer,
        })
    }

    fn observe_typing(&mut self, username: &str, now: Instant) -> Option<ChatEvent> {
        if username == self.viewer.username {
            return None;
        }
        self.typing
            .observe(username, now, self.tuning.typing_ttl)
            .then(|| self.typing_event())
    }

    /// Drop lapsed typing entries.
    pub fn expire_typing(&mut self, now: Instant) -> Option<ChatEvent> {
        self.typing.expire(now).then(|| self.typing_event())
    }

    fn typing_event(&self) -> ChatEvent {
        ChatEvent::TypingChanged(self.typing.names().map(ToOwned::to_owned).collect())
    }

    // =========================================================================
    // OUTBOUND
    // =========================================================================

    /// Replace the composer text, capped to the input limit.
    ///
    /// Returns a typing ping when one is due: connected, non-blank text, and
    /// outside the throttle window.
    pub fn set_input(&mut self, text: &str, now: Instant) -> Option<OutboundFrame> {
        self.input = text.chars().take(self.tuning.input_max_chars).collect();
        if !self.is_connected() || self.input.trim().is_empty() {
            return None;
        }
        self.typing_throttle
            .try_acquire(now)
            .then_some(OutboundFrame::Typing)
    }

    /// Take the composer text as an outbound message.
    ///
    /// No-op (input kept) when the text is blank or the socket is not
    /// connected. Otherwise the input is cleared immediately; the message
    /// only enters the log when the server echoes it back.
    pub fn take_outgoing(&mut self) -> Option<OutboundFrame> {
        if !self.is_connected() {
            return None;
        }
        let text = self.input.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_owned();
        self.input.clear();
        Some(OutboundFrame::Text(text))
    }

    /// Optimistically flip the viewer's like on `message_id`.
    ///
    /// Returns `None` if the message is not in the log.
    pub fn toggle_like(&mut self, message_id: MessageId) -> Option<ChatEvent> {
        let message = self.messages.iter_mut().find(|m| m.id == message_id)?;
        message.liked_by_viewer = !message.liked_by_viewer;
        message.likes = if message.liked_by_viewer {
            message.likes.saturating_add(1)
        } else {
            message.likes.saturating_sub(1)
        };
        Some(ChatEvent::LikesChanged {
            message_id,
            likes: message.likes,
            liked_by_viewer: message.liked_by_viewer,
        })
    }

    /// Record the latest scroll geometry reported by the view.
    pub fn update_viewport(&mut self, viewport: Viewport) {
        self.near_bottom = viewport.is_near_bottom(self.tuning.scroll_threshold_px);
    }
}
