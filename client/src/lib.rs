//! Native client for the Specto forum topic chat.
//!
//! SYSTEM CONTEXT
//! ==============
//! `state` holds the pure chat bookkeeping (message log, typing roster,
//! presence, scroll policy), `net` owns the websocket session task and the
//! REST collaborators, `notify` is the audible-cue port, and `config` loads
//! endpoints and tunables from the environment.

pub mod config;
pub mod net;
pub mod notify;
pub mod state;

pub use config::{ChatTuning, ClientConfig, ConfigError, HttpTimeouts};
pub use net::api::{ApiClient, ApiError, ChatApi};
pub use net::chat_client::{ChatCommand, ChatError, ChatHandle, ChatSession};
pub use notify::{BellNotifier, NoopNotifier, Notifier};
pub use state::auth::AuthContext;
pub use state::chat::{ChatEvent, ChatState, ConnectionStatus};
