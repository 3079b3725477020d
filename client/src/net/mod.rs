//! Networking for the forum chat.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles the REST collaborators, `chat_client` owns the topic
//! websocket session, and `types` defines the REST payload schema. Websocket
//! frame shapes live in the `frames` crate.

pub mod api;
pub mod chat_client;
pub mod types;
