//! Self-expiring roster of peers currently typing.
//!
//! Each username holds one deadline. Observing a name again pushes its
//! deadline out; nothing else removes an entry before it lapses.

#[cfg(test)]
#[path = "typing_test.rs"]
mod typing_test;

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct TypingEntry {
    username: String,
    expires_at: Instant,
}

/// Ordered by first observation, without duplicates.
#[derive(Clone, Debug, Default)]
pub struct TypingRoster {
    entries: Vec<TypingEntry>,
}

impl TypingRoster {
    /// Record that `username` is typing as of `now`.
    ///
    /// Returns `true` when the name was not already present.
    pub fn observe(&mut self, username: &str, now: Instant, ttl: Duration) -> bool {
        let expires_at = now + ttl;
        if let Some(entry) = self.entries.iter_mut().find(|e| e.username == username) {
            entry.expires_at = expires_at;
            return false;
        }
        self.entries.push(TypingEntry {
            username: username.to_owned(),
            expires_at,
        });
        true
    }

    /// Drop every entry whose deadline is at or before `now`.
    ///
    /// Returns `true` if anything was removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.expires_at > now);
        self.entries.len() != before
    }

    /// Earliest pending deadline, used to arm the session timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.expires_at).min()
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.entries.iter().any(|e| e.username == username)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.username.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Spaces outbound typing pings at least `window` apart.
#[derive(Clone, Copy, Debug)]
pub struct TypingThrottle {
    window: Duration,
    last_sent: Option<Instant>,
}

impl TypingThrottle {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_sent: None,
        }
    }

    /// Returns `true` (and arms the window) if a ping may go out at `now`.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        let open = self
            .last_sent
            .is_none_or(|last| now.saturating_duration_since(last) >= self.window);
        if open {
            self.last_sent = Some(now);
        }
        open
    }
}
