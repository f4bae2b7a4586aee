//! # Chat Socket Events
//!
//! Defines the bidirectional event protocol spoken over the chat WebSocket.
//!
//! ## Events
//!
//! Client → Server:
//! - `join_room` - [`JoinRoomData`]: subscribe to the pair's channel,
//!   lazily creating the conversation
//! - `send_message` - [`SendMessageData`]: persist and broadcast a message
//! - `typing` - [`TypingData`]: ephemeral typing notice
//!
//! Server → Client:
//! - `receive_message` - [`ChatMessage`]: delivered to every subscriber of
//!   the channel, the sender included
//! - `typing` - [`TypingData`]: relayed typing notice
//!
//! ## Example Frames
//!
//! ```text
//! {"type":"join_room","data":{"userId":7,"otherUserId":3}}
//! {"type":"send_message","data":{"conversationId":1,"from":3,"to":7,"text":"Hola!"}}
//! {"type":"receive_message","data":{"id":12,"conversation_id":1,"from_user_id":3,
//!  "to_user_id":7,"text":"Hola!","created_at":"2024-05-01T12:30:00Z"}}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted chat message as it travels on the wire.
///
/// Field spellings match the REST message records byte for byte, so a
/// client can merge history-fetch results and live events by `id` without
/// translation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Payload of the `join_room` event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct JoinRoomData {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "otherUserId")]
    pub other_user_id: i64,
}

/// Payload of the `send_message` event.
///
/// `conversationId` is accepted for compatibility with existing clients but
/// the server re-derives the conversation from `(from, to)`; a stale or
/// forged id cannot cross-post into another pair's room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendMessageData {
    #[serde(
        rename = "conversationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub conversation_id: Option<i64>,
    pub from: i64,
    pub to: i64,
    pub text: String,
}

/// Payload of the `typing` event, relayed as-is and never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TypingData {
    pub from: i64,
    pub to: i64,
}

/// Events a client sends to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(JoinRoomData),
    SendMessage(SendMessageData),
    Typing(TypingData),
}

/// Events the server pushes to subscribed clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveMessage(ChatMessage),
    Typing(TypingData),
}
