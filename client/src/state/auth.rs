//! Auth context for the current viewer.
//!
//! SYSTEM CONTEXT
//! ==============
//! Built once after the `/me` lookup and handed to the chat session and REST
//! client, so nothing reads credentials from ambient storage.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::fmt;

use frames::ChatUser;

/// Bearer credential plus the user it belongs to.
#[derive(Clone)]
pub struct AuthContext {
    token: String,
    pub user: ChatUser,
}

impl AuthContext {
    #[must_use]
    pub fn new(token: impl Into<String>, user: ChatUser) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}
