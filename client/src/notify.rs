//! Audible cue port for incoming chat messages.
//!
//! The session fires [`Notifier::message_cue`] when a message authored by
//! someone else is appended. Front-ends pick the implementation.

use std::io::Write;

pub trait Notifier: Send + Sync {
    fn message_cue(&self);
}

/// Does nothing. Used headless and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn message_cue(&self) {}
}

/// Rings the terminal bell on stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct BellNotifier;

impl Notifier for BellNotifier {
    fn message_cue(&self) {
        let mut err = std::io::stderr().lock();
        if let Err(e) = err.write_all(b"\x07").and_then(|()| err.flush()) {
            tracing::debug!(error = %e, "bell write failed");
        }
    }
}
