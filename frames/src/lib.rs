//! Wire model and JSON codec for the forum topic chat channel.
//!
//! This crate owns the frame shapes exchanged over `/forum/{topic_id}/ws`.
//! Inbound frames are JSON objects discriminated by a `type` field; outbound
//! chat messages are bare text and typing pings are a tiny JSON object.
//!
//! Decoding is two-step (generic JSON first, then the payload for the named
//! kind) so that unknown kinds surface as [`InboundFrame::Unknown`] instead of
//! an error, while malformed payloads of known kinds are reported precisely.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric chat message identifier assigned by the server.
pub type MessageId = i64;
/// Numeric forum topic identifier.
pub type TopicId = i64;
/// Numeric user identifier.
pub type UserId = i64;

/// Error returned by [`decode_inbound`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text was not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON value was not an object with a string `type` field.
    #[error("frame has no string `type` field")]
    MissingType,
    /// A known frame kind carried a payload of the wrong shape.
    #[error("invalid `{kind}` payload: {source}")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// DATA MODEL
// =============================================================================

/// Author summary embedded in every chat message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ChatUser {
    /// Upper-cased first character of the username, used when no avatar exists.
    #[must_use]
    pub fn avatar_initial(&self) -> Option<char> {
        self.username.chars().next().map(|c| c.to_ascii_uppercase())
    }

    /// Absolute avatar URL. Relative server paths are joined onto `base_url`.
    #[must_use]
    pub fn resolved_avatar_url(&self, base_url: &str) -> Option<String> {
        let path = self.avatar_url.as_deref().filter(|p| !p.is_empty())?;
        if path.starts_with("http") {
            return Some(path.to_owned());
        }
        let base = base_url.trim_end_matches('/');
        if path.starts_with('/') {
            Some(format!("{base}{path}"))
        } else {
            Some(format!("{base}/{path}"))
        }
    }
}

/// One chat message as delivered by the topic channel.
///
/// Everything except `likes` and `liked_by_viewer` is immutable once received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub topic_id: TopicId,
    pub user: ChatUser,
    /// Message body.
    #[serde(rename = "message")]
    pub text: String,
    /// Server creation timestamp, ISO-8601 as sent.
    pub created_at: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(rename = "liked_by_me", default)]
    pub liked_by_viewer: bool,
}

impl ChatMessage {
    /// `HH:MM` slice of `created_at`, if it has the expected shape.
    #[must_use]
    pub fn display_time(&self) -> Option<&str> {
        let (_, time) = self.created_at.split_once('T')?;
        let hm = time.get(..5)?;
        let bytes = hm.as_bytes();
        let digits_ok = bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit);
        (bytes[2] == b':' && digits_ok).then_some(hm)
    }
}

/// Authoritative like count broadcast after any viewer toggles a like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeUpdate {
    pub message_id: MessageId,
    pub likes: i64,
}

// =============================================================================
// INBOUND
// =============================================================================

/// Server-to-client frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundFrame {
    /// Full replacement of the message log, sent once after connecting.
    History(Vec<ChatMessage>),
    /// One new message to append.
    Message(ChatMessage),
    /// New like count for a message.
    LikeUpdate(LikeUpdate),
    /// Someone in the topic is typing.
    Typing { username: String },
    /// Number of peers currently connected to the topic.
    OnlineCount(u32),
    /// A frame with a `type` this client does not handle.
    Unknown(String),
}

impl InboundFrame {
    /// Wire name of the frame kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::History(_) => "history",
            Self::Message(_) => "message",
            Self::LikeUpdate(_) => "like_update",
            Self::Typing { .. } => "typing",
            Self::OnlineCount(_) => "online_count",
            Self::Unknown(kind) => kind,
        }
    }
}

#[derive(Deserialize)]
struct HistoryPayload {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct DataPayload<T> {
    data: T,
}

#[derive(Deserialize)]
struct TypingPayload {
    username: String,
}

#[derive(Deserialize)]
struct OnlineCountPayload {
    count: u32,
}

/// Decode one text frame from the topic channel.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for non-JSON text, [`CodecError::MissingType`]
/// when there is no string `type`, and [`CodecError::InvalidPayload`] when a
/// known kind has the wrong shape. Unknown kinds are not errors.
pub fn decode_inbound(text: &str) -> Result<InboundFrame, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(CodecError::MissingType)?
        .to_owned();

    let frame = match kind.as_str() {
        "history" => InboundFrame::History(payload::<HistoryPayload>("history", value)?.messages),
        "message" => InboundFrame::Message(payload::<DataPayload<ChatMessage>>("message", value)?.data),
        "like_update" => {
            InboundFrame::LikeUpdate(payload::<DataPayload<LikeUpdate>>("like_update", value)?.data)
        }
        "typing" => InboundFrame::Typing {
            username: payload::<TypingPayload>("typing", value)?.username,
        },
        "online_count" => InboundFrame::OnlineCount(payload::<OnlineCountPayload>("online_count", value)?.count),
        _ => InboundFrame::Unknown(kind),
    };
    Ok(frame)
}

fn payload<T>(kind: &'static str, value: Value) -> Result<T, CodecError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(value).map_err(|source| CodecError::InvalidPayload { kind, source })
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// Client-to-server frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundFrame {
    /// New chat message; sent as the bare (already trimmed) text.
    Text(String),
    /// Typing ping.
    Typing,
}

/// Encode an outbound frame as the text payload to put on the socket.
#[must_use]
pub fn encode_outbound(frame: &OutboundFrame) -> String {
    match frame {
        OutboundFrame::Text(text) => text.clone(),
        OutboundFrame::Typing => serde_json::json!({ "type": "typing" }).to_string(),
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
