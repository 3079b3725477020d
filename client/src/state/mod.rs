//! Client-side chat state.
//!
//! DESIGN
//! ======
//! State is split by concern (`auth`, `chat`, `typing`, `viewport`) and kept
//! free of I/O: every transition takes the current `Instant` explicitly so the
//! session task and the tests drive time the same way.

pub mod auth;
pub mod chat;
pub mod typing;
pub mod viewport;
