use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Conversation entity representing a complete conversation record.
///
/// `user1_id`/`user2_id` are the canonical pair: `user1_id < user2_id`
/// always holds (enforced by [`PairKey`](crate::model::pair::PairKey) on the
/// way in and by a CHECK constraint at the storage layer). The two
/// `last_message_*` fields are a denormalized cache of the most recent
/// message, used only for list views; they stay NULL until first message.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub last_message_text: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Message entity. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A conversation enriched with the counterpart's display name, as returned
/// by the conversation listing.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationForUser {
    pub id: i64,
    pub other_user_id: i64,
    /// Username, falling back to email; NULL when the user row is gone.
    pub other_user_name: Option<String>,
    pub last_message: String,
    pub last_message_at: Option<DateTime<Utc>>,
}
