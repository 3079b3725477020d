//! Websocket session for one forum topic chat.
//!
//! The `ChatSession` opens exactly one connection per topic and hands back a
//! [`ChatHandle`]. A spawned task owns the socket and the topic's
//! [`ChatState`]; the handle talks to it through a command channel, observes
//! state through a `watch` snapshot, and drains [`ChatEvent`]s for the view.
//!
//! LIFECYCLE
//! =========
//! 1. `connect` spawns the task in `Connecting`; the credential travels as
//!    the `token` query parameter.
//! 2. Handshake ok → `Connected`; handshake failure, transport error or
//!    server close → `Closed`. There is no reconnect; callers reconnect by
//!    calling `connect` again, which starts from fresh state.
//! 3. After `Closed` the task keeps serving local commands (sends are no-ops)
//!    until the handle is closed or dropped.
//! 4. Closing or dropping the handle ends the task and releases the socket,
//!    including mid-handshake.
//!
//! ERROR HANDLING
//! ==============
//! Malformed frames are logged and dropped without touching the connection.
//! Like toggles are optimistic; their REST call is fire-and-forget and a
//! failure is logged but never rolled back.

#[cfg(test)]
#[path = "chat_client_test.rs"]
mod chat_client_test;

use std::sync::Arc;
use std::time::Instant;

use frames::{MessageId, OutboundFrame, TopicId};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::api::ChatApi;
use crate::config::ClientConfig;
use crate::notify::Notifier;
use crate::state::auth::AuthContext;
use crate::state::chat::{ChatEvent, ChatState, ConnectionStatus};
use crate::state::viewport::Viewport;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Errors raised before a session task starts.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The websocket URL for the topic could not be built.
    #[error("invalid websocket URL: {0}")]
    InvalidUrl(String),
}

/// User action forwarded to the session task.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatCommand {
    /// Composer text changed.
    Edit(String),
    /// Send the composer text.
    Submit,
    ToggleLike(MessageId),
    /// Scroll geometry changed.
    Viewport(Viewport),
}

/// Build the topic channel URL with the credential as a query parameter.
///
/// # Errors
///
/// Returns [`ChatError::InvalidUrl`] if the base URL does not parse.
pub fn chat_url(ws_base_url: &str, topic_id: TopicId, token: &str) -> Result<String, ChatError> {
    let raw = format!("{}/forum/{topic_id}/ws", ws_base_url.trim_end_matches('/'));
    let mut url = reqwest::Url::parse(&raw).map_err(|e| ChatError::InvalidUrl(e.to_string()))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url.into())
}

// =============================================================================
// SESSION
// =============================================================================

/// Factory for topic chat connections.
#[derive(Clone)]
pub struct ChatSession {
    config: ClientConfig,
    auth: AuthContext,
    api: Arc<dyn ChatApi>,
    notifier: Arc<dyn Notifier>,
}

impl ChatSession {
    #[must_use]
    pub fn new(config: ClientConfig, auth: AuthContext, api: Arc<dyn ChatApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            auth,
            api,
            notifier,
        }
    }

    /// Open the chat channel for `topic_id`. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidUrl`] if the configured websocket base is unusable.
    pub fn connect(&self, topic_id: TopicId) -> Result<ChatHandle, ChatError> {
        let url = chat_url(&self.config.ws_base_url, topic_id, self.auth.token())?;
        let state = ChatState::new(topic_id, self.auth.user.clone(), self.config.tuning);

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(state.clone());

        let task = SessionTask {
            state,
            api: Arc::clone(&self.api),
            notifier: Arc::clone(&self.notifier),
            state_tx,
            events_tx,
        };
        let join = tokio::spawn(task.run(url, commands_rx));

        Ok(ChatHandle {
            topic_id,
            commands: commands_tx,
            state: state_rx,
            events: events_rx,
            task: join,
        })
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// Caller side of one topic connection.
pub struct ChatHandle {
    topic_id: TopicId,
    commands: mpsc::UnboundedSender<ChatCommand>,
    state: watch::Receiver<ChatState>,
    events: mpsc::UnboundedReceiver<ChatEvent>,
    task: JoinHandle<()>,
}

impl ChatHandle {
    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    /// Forward a command. Ignored once the session task has ended.
    pub fn command(&self, command: ChatCommand) {
        if self.commands.send(command).is_err() {
            debug!(topic_id = self.topic_id, "chat: command dropped, session ended");
        }
    }

    pub fn edit(&self, text: impl Into<String>) {
        self.command(ChatCommand::Edit(text.into()));
    }

    pub fn submit(&self) {
        self.command(ChatCommand::Submit);
    }

    /// Replace the composer text and submit it.
    pub fn send(&self, text: impl Into<String>) {
        self.edit(text);
        self.submit();
    }

    pub fn toggle_like(&self, message_id: MessageId) {
        self.command(ChatCommand::ToggleLike(message_id));
    }

    pub fn report_viewport(&self, viewport: Viewport) {
        self.command(ChatCommand::Viewport(viewport));
    }

    /// Copy of the latest published state.
    #[must_use]
    pub fn snapshot(&self) -> ChatState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.state.borrow().status
    }

    /// Next view event; `None` once the session task has ended and the queue is drained.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        self.events.recv().await
    }

    /// Wait until the published state satisfies `predicate`.
    ///
    /// Returns `None` if the session ended first.
    pub async fn wait_for(&mut self, mut predicate: impl FnMut(&ChatState) -> bool) -> Option<ChatState> {
        self.state
            .wait_for(|state| predicate(state))
            .await
            .ok()
            .map(|state| state.clone())
    }

    /// End the session and wait for the socket to be released.
    pub async fn close(self) {
        let Self { commands, task, topic_id, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            warn!(topic_id, error = %e, "chat: session task failed");
        }
    }
}

// =============================================================================
// TASK
// =============================================================================

struct SessionTask {
    state: ChatState,
    api: Arc<dyn ChatApi>,
    notifier: Arc<dyn Notifier>,
    state_tx: watch::Sender<ChatState>,
    events_tx: mpsc::UnboundedSender<ChatEvent>,
}

impl SessionTask {
    async fn run(mut self, url: String, mut commands: mpsc::UnboundedReceiver<ChatCommand>) {
        let topic_id = self.state.topic_id;

        let connect = connect_async(url);
        tokio::pin!(connect);
        let mut socket = loop {
            tokio::select! {
                result = &mut connect => match result {
                    Ok((socket, _)) => break Some(socket),
                    Err(e) => {
                        warn!(topic_id, error = %e, "chat: connect failed");
                        break None;
                    }
                },
                command = commands.recv() => {
                    let Some(command) = command else {
                        info!(topic_id, "chat: closed during handshake");
                        return;
                    };
                    self.handle_command(command, &mut None).await;
                }
            }
        };

        if socket.is_some() {
            info!(topic_id, "chat: connected");
            self.set_status(ConnectionStatus::Connected);
        } else {
            self.set_status(ConnectionStatus::Closed);
        }

        loop {
            let deadline = self.state.typing.next_deadline();
            tokio::select! {
                inbound = next_inbound(&mut socket) => self.handle_inbound(inbound, &mut socket),
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command, &mut socket).await;
                }
                () = sleep_until(deadline) => {
                    if let Some(event) = self.state.expire_typing(Instant::now()) {
                        self.emit(vec![event]);
                    }
                }
            }
        }

        if let Some(mut socket) = socket {
            if let Err(e) = socket.close(None).await {
                debug!(topic_id, error = %e, "chat: close handshake failed");
            }
        }
        info!(topic_id, "chat: session ended");
    }

    fn handle_inbound(
        &mut self,
        inbound: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>,
        socket: &mut Option<WsStream>,
    ) {
        let topic_id = self.state.topic_id;
        match inbound {
            Some(Ok(Message::Text(text))) => match frames::decode_inbound(text.as_str()) {
                Ok(frame) => {
                    let events = self.state.apply_frame(frame, Instant::now());
                    self.emit(events);
                }
                Err(e) => warn!(topic_id, error = %e, "chat: dropping malformed frame"),
            },
            Some(Ok(Message::Close(reason))) => {
                info!(topic_id, ?reason, "chat: server closed connection");
                *socket = None;
                self.set_status(ConnectionStatus::Closed);
            }
            Some(Ok(other)) => debug!(topic_id, len = other.len(), "chat: ignoring non-text frame"),
            Some(Err(e)) => {
                warn!(topic_id, error = %e, "chat: transport error");
                *socket = None;
                self.set_status(ConnectionStatus::Closed);
            }
            None => {
                info!(topic_id, "chat: connection ended");
                *socket = None;
                self.set_status(ConnectionStatus::Closed);
            }
        }
    }

    async fn handle_command(&mut self, command: ChatCommand, socket: &mut Option<WsStream>) {
        match command {
            ChatCommand::Edit(text) => {
                if let Some(frame) = self.state.set_input(&text, Instant::now()) {
                    self.transmit(frame, socket).await;
                }
                self.publish();
            }
            ChatCommand::Submit => {
                if let Some(frame) = self.state.take_outgoing() {
                    self.transmit(frame, socket).await;
                }
                self.publish();
            }
            ChatCommand::ToggleLike(message_id) => {
                if let Some(event) = self.state.toggle_like(message_id) {
                    self.emit(vec![event]);
                }
                self.spawn_like_request(message_id);
            }
            ChatCommand::Viewport(viewport) => {
                self.state.update_viewport(viewport);
                self.publish();
            }
        }
    }

    async fn transmit(&mut self, frame: OutboundFrame, socket: &mut Option<WsStream>) {
        let Some(ws) = socket.as_mut() else {
            return;
        };
        let text = frames::encode_outbound(&frame);
        if let Err(e) = ws.send(Message::text(text)).await {
            warn!(topic_id = self.state.topic_id, error = %e, "chat: send failed");
            *socket = None;
            self.set_status(ConnectionStatus::Closed);
        }
    }

    fn spawn_like_request(&self, message_id: MessageId) {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            match api.toggle_like(message_id).await {
                Ok(result) => debug!(message_id, likes = result.likes, liked = result.liked, "chat: like toggled"),
                Err(e) => warn!(message_id, error = %e, "chat: like toggle failed, keeping local state"),
            }
        });
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if let Some(event) = self.state.set_status(status) {
            self.emit(vec![event]);
        }
    }

    /// Publish state, fire the audible cue if due, then forward events.
    fn emit(&self, events: Vec<ChatEvent>) {
        self.publish();
        for event in events {
            if event == ChatEvent::MessageCue {
                self.notifier.message_cue();
            }
            // The handle may have stopped listening; state is still published.
            let _ = self.events_tx.send(event);
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

async fn next_inbound(
    socket: &mut Option<WsStream>,
) -> Option<Result<Message, tokio_tungstenite::tungstenite::Error>> {
    match socket {
        Some(ws) => ws.next().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}
