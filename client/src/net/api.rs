//! REST client for the forum endpoints.
//!
//! Every call carries the viewer's bearer credential. The chat session only
//! needs the like toggle, which it reaches through the [`ChatApi`] seam so
//! tests can substitute a recording fake.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-success statuses and undecodable bodies all map to
//! [`ApiError`]; callers decide whether a failure matters (the chat session
//! only logs like-toggle failures).

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use frames::{MessageId, TopicId};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{CurrentUser, EnsureTopic, ForumPost, ForumTopList, ForumTopic, ForumTopicDetail, LikeToggle};
use crate::config::ClientConfig;

/// Maximum accepted forum post length, in characters.
pub const POST_MAX_CHARS: usize = 1000;

/// Errors produced by REST calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    /// The bearer credential could not be encoded as a header.
    #[error("invalid credential header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    /// The HTTP request failed before a response arrived.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server rejected the credential (401).
    #[error("unauthorized: credential missing or expired")]
    Unauthorized,
    /// The addressed resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other non-success status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },
    /// The response body could not be decoded.
    #[error("API response parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    /// Input was rejected before sending.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

/// REST operations the chat session depends on.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    /// Toggle the viewer's like on a chat message.
    async fn toggle_like(&self, message_id: MessageId) -> Result<LikeToggle, ApiError>;
}

// =============================================================================
// ENDPOINTS
// =============================================================================

fn topic_endpoint(topic_id: TopicId) -> String {
    format!("/forum/topics/{topic_id}")
}

fn topic_posts_endpoint(topic_id: TopicId) -> String {
    format!("/forum/topics/{topic_id}/posts")
}

fn message_like_endpoint(message_id: MessageId) -> String {
    format!("/forum/messages/{message_id}/like")
}

/// Trim and bound a post body the way the backend validates it.
fn validate_post_content(content: &str) -> Result<String, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput("post content is empty"));
    }
    if trimmed.chars().count() > POST_MAX_CHARS {
        return Err(ApiError::InvalidInput("post content exceeds 1000 characters"));
    }
    Ok(trimmed.to_owned())
}

fn status_error(status: u16, path: &str, body: String) -> ApiError {
    match status {
        401 => ApiError::Unauthorized,
        404 => ApiError::NotFound(path.to_owned()),
        _ => ApiError::Status { status, body },
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Build a client that authenticates every call with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ClientConfig, token: &str) -> Result<Self, ApiError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// `GET /me`.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.get("/me").await
    }

    /// `GET /forum/topics`: most recent topics first.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn list_topics(&self) -> Result<Vec<ForumTopic>, ApiError> {
        self.get("/forum/topics").await
    }

    /// `GET /forum/topics/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown topics.
    pub async fn topic_detail(&self, topic_id: TopicId) -> Result<ForumTopicDetail, ApiError> {
        self.get(&topic_endpoint(topic_id)).await
    }

    /// `POST /forum/topics/ensure`: find or create the topic for a title.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn ensure_topic(&self, body: &EnsureTopic) -> Result<ForumTopic, ApiError> {
        self.send(reqwest::Method::POST, "/forum/topics/ensure", Some(body))
            .await
    }

    /// `POST /forum/topics/{id}/posts`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for blank or oversized content
    /// without contacting the server.
    pub async fn create_post(&self, topic_id: TopicId, content: &str) -> Result<ForumPost, ApiError> {
        let content = validate_post_content(content)?;
        let body = serde_json::json!({ "content": content });
        self.send(reqwest::Method::POST, &topic_posts_endpoint(topic_id), Some(&body))
            .await
    }

    /// `GET /forum/top-items`.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn top_items(&self) -> Result<ForumTopList, ApiError> {
        self.get("/forum/top-items").await
    }

    /// `POST /forum/messages/{id}/like` with no body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn toggle_message_like(&self, message_id: MessageId) -> Result<LikeToggle, ApiError> {
        self.send::<(), _>(reqwest::Method::POST, &message_like_endpoint(message_id), None)
            .await
    }

    async fn get<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.send::<(), _>(reqwest::Method::GET, path, None).await
    }

    async fn send<B, T>(&self, method: reqwest::Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.api_url(path);
        let request = self.http.request(method.clone(), &url);
        let request = if let Some(body) = body {
            request.json(body)
        } else {
            request
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        if !(200..300).contains(&status) {
            tracing::debug!(%method, %path, status, "api: request failed");
            return Err(status_error(status, path, text));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait::async_trait]
impl ChatApi for ApiClient {
    async fn toggle_like(&self, message_id: MessageId) -> Result<LikeToggle, ApiError> {
        self.toggle_message_like(message_id).await
    }
}
