//! # Chat Session Orchestration
//!
//! One [`ChatSession`] per open chat box. It owns the startup ordering the
//! backend expects:
//!
//! 1. join the realtime room (so no live message is missed),
//! 2. bootstrap the conversation over REST (get or create, yields the id),
//! 3. fetch history and merge it with any live events that raced ahead.
//!
//! Messages are deduplicated by server-assigned id, which makes the merge
//! safe regardless of whether history or the first live event arrives
//! first. Sends go through the socket and the UI renders the broadcast
//! echo; an empty-after-trim send is suppressed client-side, mirroring the
//! server's validation.

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::socket::{ChatSocket, SocketEvent};
use async_channel::Receiver;
use shared::dto::chat::{
    ChatMessage, ClientEvent, JoinRoomData, SendMessageData, ServerEvent, TypingData,
};
use std::collections::HashSet;
use tracing::debug;

/// Events a chat UI consumes from [`ChatSession::next_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new message for this conversation (sender's own echoes included).
    MessageReceived(ChatMessage),
    /// The counterpart is typing.
    PeerTyping,
    /// Realtime connectivity changed; `true` means live delivery is active.
    ConnectionChanged(bool),
    /// The socket gave up; only the REST fallback remains.
    Ended,
}

/// Pure session bookkeeping, separated from the transports for testability.
#[derive(Debug)]
pub struct SessionState {
    user_id: i64,
    other_user_id: i64,
    conversation_id: Option<i64>,
    messages: Vec<ChatMessage>,
    seen: HashSet<i64>,
}

impl SessionState {
    pub fn new(user_id: i64, other_user_id: i64) -> Self {
        Self {
            user_id,
            other_user_id,
            conversation_id: None,
            messages: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation_id
    }

    pub fn set_conversation(&mut self, id: i64) {
        self.conversation_id = Some(id);
    }

    /// Messages in render order (ascending creation, id tie-break).
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Merge a history fetch into the session, id-deduplicated.
    ///
    /// Live events can land before the history response; after the merge
    /// the list is re-sorted so scrollback order matches the server's
    /// listing contract.
    pub fn ingest_history(&mut self, history: Vec<ChatMessage>) {
        for message in history {
            if self.seen.insert(message.id) {
                self.messages.push(message);
            }
        }
        self.messages
            .sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
    }

    /// Ingest one live message. Returns `true` when it was appended, `false`
    /// for duplicates and for messages of other conversations.
    pub fn ingest_live(&mut self, message: &ChatMessage) -> bool {
        if self.conversation_id != Some(message.conversation_id) {
            return false;
        }
        if !self.seen.insert(message.id) {
            return false;
        }
        self.messages.push(message.clone());
        true
    }

    /// Build the send payload, or `None` when the trimmed text is empty.
    pub fn prepare_send(&self, text: &str) -> Option<SendMessageData> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(SendMessageData {
            conversation_id: self.conversation_id,
            from: self.user_id,
            to: self.other_user_id,
            text: trimmed.to_string(),
        })
    }

    /// Whether a typing notice comes from the counterpart of this session.
    pub fn is_peer_typing(&self, data: &TypingData) -> bool {
        data.from == self.other_user_id && data.to == self.user_id
    }

    fn join_data(&self) -> JoinRoomData {
        JoinRoomData {
            user_id: self.user_id,
            other_user_id: self.other_user_id,
        }
    }
}

/// A live chat session between the local user and one counterpart.
pub struct ChatSession {
    api: ApiClient,
    socket: ChatSocket,
    events: Receiver<SocketEvent>,
    state: SessionState,
}

impl ChatSession {
    /// Open a session: connect the socket, join the room, bootstrap the
    /// conversation, and load history.
    pub async fn open(
        api: ApiClient,
        user_id: i64,
        other_user_id: i64,
    ) -> Result<Self, ClientError> {
        let (socket, events) = ChatSocket::connect(api.ws_url());
        let mut state = SessionState::new(user_id, other_user_id);

        // Join before the bootstrap so nothing sent during the REST round
        // trip is missed.
        socket.send(ClientEvent::JoinRoom(state.join_data())).await?;

        let handle = api.bootstrap_conversation(user_id, other_user_id).await?;
        state.set_conversation(handle.conversation_id);

        let history = api.fetch_messages(handle.conversation_id).await?;
        state.ingest_history(history);

        Ok(Self { api, socket, events, state })
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.state.conversation_id()
    }

    /// Messages in render order.
    pub fn messages(&self) -> &[ChatMessage] {
        self.state.messages()
    }

    /// Send a message over the realtime path.
    ///
    /// Returns `false` when the text was empty after trimming (nothing was
    /// sent). The message appears in [`Self::messages`] once the broadcast
    /// echo arrives, not before.
    pub async fn send(&self, text: &str) -> Result<bool, ClientError> {
        match self.state.prepare_send(text) {
            Some(data) => {
                self.socket.send(ClientEvent::SendMessage(data)).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Send a message over the REST fallback and ingest the stored record
    /// directly (no echo fires on this path).
    pub async fn send_fallback(&mut self, text: &str) -> Result<bool, ClientError> {
        let Some(data) = self.state.prepare_send(text) else {
            return Ok(false);
        };
        let conversation_id = data.conversation_id.ok_or_else(|| {
            ClientError::Socket("Session has no conversation yet".to_string())
        })?;

        let stored = self
            .api
            .send_message_fallback(conversation_id, data.from, data.to, &data.text)
            .await?;
        self.state.ingest_live(&stored);
        Ok(true)
    }

    /// Notify the counterpart that the local user is typing.
    pub async fn notice_typing(&self) -> Result<(), ClientError> {
        self.socket
            .send(ClientEvent::Typing(TypingData {
                from: self.state.user_id,
                to: self.state.other_user_id,
            }))
            .await
    }

    /// Wait for the next session event, folding socket bookkeeping (rejoin
    /// after reconnect, dedup, foreign-conversation filtering) away from
    /// the UI. Returns `None` once the socket has ended for good.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            match self.events.recv().await.ok()? {
                SocketEvent::Connected => {
                    // Rooms do not survive a reconnect; join again.
                    if let Err(err) = self
                        .socket
                        .send(ClientEvent::JoinRoom(self.state.join_data()))
                        .await
                    {
                        debug!(error = %err, "Re-join after reconnect failed");
                    }
                    return Some(SessionEvent::ConnectionChanged(true));
                }
                SocketEvent::Disconnected => {
                    return Some(SessionEvent::ConnectionChanged(false));
                }
                SocketEvent::Server(ServerEvent::ReceiveMessage(message)) => {
                    if self.state.ingest_live(&message) {
                        return Some(SessionEvent::MessageReceived(message));
                    }
                }
                SocketEvent::Server(ServerEvent::Typing(data)) => {
                    if self.state.is_peer_typing(&data) {
                        return Some(SessionEvent::PeerTyping);
                    }
                }
                SocketEvent::Closed => {
                    return Some(SessionEvent::Ended);
                }
            }
        }
    }
}
