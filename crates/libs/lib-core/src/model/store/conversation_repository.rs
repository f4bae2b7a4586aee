//! # Conversation Repository
//!
//! Database access layer for conversation records.
//!
//! The central operation is [`ConversationRepository::get_or_create`]: both
//! the REST bootstrap and the realtime join funnel through it, so it has to
//! stay safe under concurrent first-contact from both transports at once.
//! The UNIQUE constraint on the canonical pair does the heavy lifting: the
//! loser of an insert race falls through to a re-select instead of creating
//! a second row.

use super::models::{Conversation, ConversationForUser};
use super::DbPool;
use crate::error::{AppError, Result};
use crate::model::pair::PairKey;
use chrono::{DateTime, Utc};
use sqlx::query_as;

/// Conversation repository for database operations.
pub struct ConversationRepository;

impl ConversationRepository {
    /// Look up the conversation for a canonical pair.
    ///
    /// If duplicate rows exist (legacy data predating the uniqueness
    /// constraint), the earliest-created row wins.
    pub async fn find_by_pair(pool: &DbPool, pair: PairKey) -> Result<Option<Conversation>> {
        let conversation = query_as::<_, Conversation>(
            r#"
            SELECT id, user1_id, user2_id, last_message_text, last_message_at, created_at
            FROM conversations
            WHERE user1_id = ? AND user2_id = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(pair.low)
        .bind(pair.high)
        .fetch_optional(pool)
        .await?;

        Ok(conversation)
    }

    /// Get the conversation for a pair, creating it when absent.
    ///
    /// Safe under concurrent first-contact: `ON CONFLICT DO NOTHING` makes
    /// the racing insert a no-op and the following re-select picks up the
    /// winner's row. At most one conversation per pair ever exists.
    pub async fn get_or_create(pool: &DbPool, pair: PairKey) -> Result<Conversation> {
        if let Some(existing) = Self::find_by_pair(pool, pair).await? {
            return Ok(existing);
        }

        sqlx::query(
            r#"
            INSERT INTO conversations (user1_id, user2_id)
            VALUES (?, ?)
            ON CONFLICT(user1_id, user2_id) DO NOTHING
            "#,
        )
        .bind(pair.low)
        .bind(pair.high)
        .execute(pool)
        .await?;

        Self::find_by_pair(pool, pair).await?.ok_or_else(|| {
            AppError::Database(format!(
                "Conversation for pair ({}, {}) missing after insert",
                pair.low, pair.high
            ))
        })
    }

    /// Find a conversation by its id.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Conversation>> {
        let conversation = query_as::<_, Conversation>(
            r#"
            SELECT id, user1_id, user2_id, last_message_text, last_message_at, created_at
            FROM conversations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(conversation)
    }

    /// List all conversations a user participates in, newest activity first.
    ///
    /// Each row carries the counterpart's display name (username, email as
    /// fallback). Conversations with no messages yet sort last.
    pub async fn list_for_user(pool: &DbPool, user_id: i64) -> Result<Vec<ConversationForUser>> {
        let conversations = query_as::<_, ConversationForUser>(
            r#"
            SELECT
                c.id,
                CASE WHEN c.user1_id = ? THEN c.user2_id ELSE c.user1_id END AS other_user_id,
                COALESCE(NULLIF(u.username, ''), u.email) AS other_user_name,
                COALESCE(c.last_message_text, '') AS last_message,
                c.last_message_at
            FROM conversations c
            LEFT JOIN users u
                ON u.id = CASE WHEN c.user1_id = ? THEN c.user2_id ELSE c.user1_id END
            WHERE c.user1_id = ? OR c.user2_id = ?
            ORDER BY c.last_message_at IS NULL, c.last_message_at DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(conversations)
    }

    /// Update the denormalized last-message summary.
    ///
    /// Best-effort cache refresh: callers log and continue on failure, the
    /// message row itself is the source of truth. Last writer wins under
    /// concurrent sends.
    pub async fn record_last_message(
        pool: &DbPool,
        conversation_id: i64,
        text: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_text = ?, last_message_at = ?
            WHERE id = ?
            "#,
        )
        .bind(text)
        .bind(at)
        .bind(conversation_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::test_support::{seed_user, test_pool};
    use lib_utils::time::now_utc;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let pool = test_pool().await;
        let pair = PairKey::new(7, 3).unwrap();

        let first = ConversationRepository::get_or_create(&pool, pair).await.unwrap();
        let second = ConversationRepository::get_or_create(&pool, pair).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.user1_id, 3);
        assert_eq!(first.user2_id, 7);
        assert!(first.last_message_text.is_none());
        assert!(first.last_message_at.is_none());
    }

    #[tokio::test]
    async fn concurrent_first_contact_creates_one_row() {
        let pool = test_pool().await;
        let pair = PairKey::new(3, 7).unwrap();

        // Both participants bootstrap at once, one via REST and one via the
        // realtime join; the pair constraint must collapse them to one row.
        let (a, b) = tokio::join!(
            ConversationRepository::get_or_create(&pool, pair),
            ConversationRepository::get_or_create(&pool, pair),
        );
        assert_eq!(a.unwrap().id, b.unwrap().id);

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM conversations WHERE user1_id = 3 AND user2_id = 7")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn list_for_user_orders_by_activity_with_empty_last() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice", "alice@example.com").await;
        let bob = seed_user(&pool, "bob", "bob@example.com").await;
        let carol = seed_user(&pool, "carol", "carol@example.com").await;

        let with_message =
            ConversationRepository::get_or_create(&pool, PairKey::new(alice, bob).unwrap())
                .await
                .unwrap();
        let without_message =
            ConversationRepository::get_or_create(&pool, PairKey::new(alice, carol).unwrap())
                .await
                .unwrap();

        ConversationRepository::record_last_message(&pool, with_message.id, "Hola!", now_utc())
            .await
            .unwrap();

        let listed = ConversationRepository::list_for_user(&pool, alice).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, with_message.id);
        assert_eq!(listed[0].last_message, "Hola!");
        assert_eq!(listed[0].other_user_name.as_deref(), Some("bob"));
        assert_eq!(listed[1].id, without_message.id);
        assert_eq!(listed[1].last_message, "");
        assert!(listed[1].last_message_at.is_none());
    }

    #[tokio::test]
    async fn list_for_user_survives_missing_user_row() {
        let pool = test_pool().await;

        // Counterpart id 99 has no users row; the name comes back NULL and
        // the caller renders a placeholder.
        let conversation =
            ConversationRepository::get_or_create(&pool, PairKey::new(1, 99).unwrap())
                .await
                .unwrap();

        let listed = ConversationRepository::list_for_user(&pool, 1).await.unwrap();
        assert_eq!(listed[0].id, conversation.id);
        assert_eq!(listed[0].other_user_id, 99);
        assert!(listed[0].other_user_name.is_none());
    }

    #[tokio::test]
    async fn duplicate_rows_resolve_to_earliest() {
        let pool = test_pool().await;

        // Simulate legacy duplicates: the UNIQUE constraint forbids them in
        // the live schema, so rebuild the table without it and seed two rows
        // for the same pair.
        sqlx::query("DROP TABLE conversations")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            r#"
            CREATE TABLE conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user1_id INTEGER NOT NULL,
                user2_id INTEGER NOT NULL,
                last_message_text TEXT,
                last_message_at TIMESTAMP,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        for _ in 0..2 {
            sqlx::query("INSERT INTO conversations (user1_id, user2_id) VALUES (3, 7)")
                .execute(&pool)
                .await
                .unwrap();
        }

        let pair = PairKey::new(3, 7).unwrap();
        let found = ConversationRepository::find_by_pair(&pool, pair).await.unwrap().unwrap();
        let earliest: i64 =
            sqlx::query_scalar("SELECT MIN(id) FROM conversations WHERE user1_id = 3 AND user2_id = 7")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(found.id, earliest);

        // get_or_create must return the same row and never create a third.
        let got = ConversationRepository::get_or_create(&pool, pair).await.unwrap();
        assert_eq!(got.id, earliest);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
