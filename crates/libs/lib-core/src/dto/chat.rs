//! # Chat Data Transfer Objects
//!
//! Request and response structures for the chat REST endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/chat/conversation` - [`ConversationRequest`] -> [`ConversationResponse`]
//! - `GET /api/chat/conversations/{user_id}` - [`ConversationSummary`] list
//! - `GET /api/chat/messages/{conversation_id}` - message record list
//! - `POST /api/chat/messages` - [`SendMessageRequest`] -> message record
//!
//! ## Wire Format
//!
//! Field spellings follow the original API contract rather than one casing
//! convention: requests and list items use camelCase, while the bootstrap
//! response mixes `conversationId` with snake_case row fields. The serde
//! rename attributes below are the contract; do not "clean them up".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /conversation`.
///
/// Ids arrive as JSON numbers or numeric strings depending on the caller;
/// they are kept raw here and coerced by
/// [`parse_user_id`](crate::model::pair::parse_user_id) so that a missing
/// field and a malformed one produce distinct 400 messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationRequest {
    #[serde(rename = "userId", default)]
    pub user_id: Value,
    #[serde(rename = "otherUserId", default)]
    pub other_user_id: Value,
}

/// Response of `POST /conversation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    #[serde(rename = "conversationId")]
    pub conversation_id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub last_message_text: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// One element of the `GET /conversations/{user_id}` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: i64,
    #[serde(rename = "otherUserId")]
    pub other_user_id: i64,
    #[serde(rename = "otherUserName")]
    pub other_user_name: String,
    #[serde(rename = "lastMessage")]
    pub last_message: String,
    #[serde(rename = "lastMessageAt")]
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Body of `POST /messages` (the REST fallback send path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "conversationId")]
    pub conversation_id: Option<i64>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub text: Option<String>,
}
