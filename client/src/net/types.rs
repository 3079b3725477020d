//! REST payload schema for the forum endpoints.
//!
//! DESIGN
//! ======
//! These types mirror the backend response models. Unknown fields are
//! ignored so the client tolerates additive server changes.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use frames::{ChatUser, TopicId, UserId};
use serde::{Deserialize, Serialize};

/// The authenticated user as returned by `GET /me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<CurrentUser> for ChatUser {
    fn from(user: CurrentUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar_url: user.avatar_url,
        }
    }
}

/// A forum topic (one per movie/series).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumTopic {
    pub id: TopicId,
    /// Topic category, e.g. `"custom"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

/// A threaded post on a topic page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub user: ChatUser,
}

/// Topic plus its posts, from `GET /forum/topics/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForumTopicDetail {
    #[serde(flatten)]
    pub topic: ForumTopic,
    #[serde(rename = "topItems", default)]
    pub top_items: Vec<ForumTopItem>,
    #[serde(default)]
    pub posts: Vec<ForumPost>,
}

/// Trending catalog entry suggested as a discussion topic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForumTopItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Trending movies and series, from `GET /forum/top-items`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForumTopList {
    pub movies: Vec<ForumTopItem>,
    pub series: Vec<ForumTopItem>,
}

/// Catalog media kind a topic is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

/// Body of `POST /forum/topics/ensure`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureTopic {
    pub tmdb_id: i64,
    pub media_type: MediaType,
    pub title: String,
}

/// Response of `POST /forum/messages/{id}/like`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes: i64,
}
