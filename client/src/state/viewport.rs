//! Scroll position tracking for the message list.
//!
//! The view reports its scroll geometry; the chat state keeps only whether
//! the newest message was within the threshold at the last report.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

/// Scroll geometry of the message list, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Offset of the visible top edge from the content top.
    pub scroll_top: f64,
    /// Height of the visible area.
    pub client_height: f64,
    /// Total content height.
    pub scroll_height: f64,
}

impl Viewport {
    /// Pixels between the visible bottom edge and the end of the content.
    #[must_use]
    pub fn distance_from_bottom(&self) -> f64 {
        (self.scroll_height - self.scroll_top - self.client_height).max(0.0)
    }

    /// Inclusive: exactly `threshold_px` away still counts as near.
    #[must_use]
    pub fn is_near_bottom(&self, threshold_px: f64) -> bool {
        self.distance_from_bottom() <= threshold_px
    }
}

/// Why the message list changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollTrigger {
    HistoryLoaded,
    OwnMessage,
    PeerMessage,
}

/// Auto-scroll decision for one append or reload.
///
/// History loads and the viewer's own messages always scroll; peer messages
/// scroll only when the list was already at the bottom.
#[must_use]
pub fn should_autoscroll(trigger: ScrollTrigger, was_near_bottom: bool) -> bool {
    match trigger {
        ScrollTrigger::HistoryLoaded | ScrollTrigger::OwnMessage => true,
        ScrollTrigger::PeerMessage => was_near_bottom,
    }
}
