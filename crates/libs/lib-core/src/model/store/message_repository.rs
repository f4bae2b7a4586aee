//! # Message Repository
//!
//! Database access layer for chat messages.
//!
//! Messages are append-only: created through [`MessageRepository::append`]
//! with a server-assigned timestamp, never mutated, never deleted. The
//! listing order (`created_at` ascending, id as tie-break) is the contract
//! clients rely on to render scrollback.

use super::models::StoredMessage;
use super::DbPool;
use crate::error::{AppError, Result};
use lib_utils::time::now_utc;
use lib_utils::validation::validate_positive_id;
use sqlx::query_as;

/// Message repository for database operations.
pub struct MessageRepository;

impl MessageRepository {
    /// Persist a new message and return the stored record.
    ///
    /// Text is trimmed before storage; empty-after-trim text fails with
    /// [`AppError::EmptyMessage`] and leaves no row. Non-positive ids fail
    /// with [`AppError::InvalidInput`].
    pub async fn append(
        pool: &DbPool,
        conversation_id: i64,
        from_user_id: i64,
        to_user_id: i64,
        text: &str,
    ) -> Result<StoredMessage> {
        validate_positive_id(conversation_id, "conversationId").map_err(AppError::InvalidInput)?;
        validate_positive_id(from_user_id, "from").map_err(AppError::InvalidInput)?;
        validate_positive_id(to_user_id, "to").map_err(AppError::InvalidInput)?;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::EmptyMessage);
        }

        let created_at = now_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO messages (conversation_id, from_user_id, to_user_id, text, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(conversation_id)
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(trimmed)
        .bind(created_at)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        let message = query_as::<_, StoredMessage>(
            r#"
            SELECT id, conversation_id, from_user_id, to_user_id, text, created_at
            FROM messages
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    /// All messages of a conversation, earliest first.
    ///
    /// Full history, no pagination; the id tie-break keeps same-timestamp
    /// messages in insertion order.
    pub async fn list_by_conversation(
        pool: &DbPool,
        conversation_id: i64,
    ) -> Result<Vec<StoredMessage>> {
        let messages = query_as::<_, StoredMessage>(
            r#"
            SELECT id, conversation_id, from_user_id, to_user_id, text, created_at
            FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }
}
