//! # Chat REST Handlers
//!
//! The request/response surface of the chat gateway: conversation bootstrap,
//! conversation listing, history fetch, and the fallback send path.
//!
//! ## Endpoints
//!
//! - `POST /api/chat/conversation` - Get or create the conversation for a pair
//! - `GET /api/chat/conversations/{user_id}` - List a user's conversations
//! - `GET /api/chat/messages/{conversation_id}` - Message history, ascending
//! - `POST /api/chat/messages` - Persist a message without broadcasting
//!
//! The send endpoint exists for clients whose realtime connection is down.
//! It writes through the same stores as the push path but intentionally
//! emits no `receive_message` event; only the realtime path broadcasts.

use crate::chat::gateway::to_wire;
use axum::extract::{Path, State};
use axum::Json;
use lib_core::dto::chat::{
    ConversationRequest, ConversationResponse, ConversationSummary, SendMessageRequest,
};
use lib_core::error::Result;
use lib_core::model::pair::{parse_user_id, PairKey};
use lib_core::model::store::{ConversationRepository, MessageRepository};
use lib_core::{AppError, Config, DbPool};
use lib_utils::validation::{validate_max_length, validate_positive_id};
use shared::dto::chat::ChatMessage;
use tracing::{instrument, warn};

#[cfg(test)]
mod tests;

/// Get or create the conversation between two users.
///
/// **Route**: `POST /api/chat/conversation`
///
/// The pair is canonicalized before lookup, so `{userId:7, otherUserId:3}`
/// and `{userId:3, otherUserId:7}` resolve to the same record.
#[instrument(skip(db, payload))]
pub async fn create_conversation(
    State(db): State<DbPool>,
    Json(payload): Json<ConversationRequest>,
) -> Result<Json<ConversationResponse>> {
    let user_id = parse_user_id(&payload.user_id, "userId")?;
    let other_user_id = parse_user_id(&payload.other_user_id, "otherUserId")?;

    let pair = PairKey::new(user_id, other_user_id)?;
    let conversation = ConversationRepository::get_or_create(&db, pair).await?;

    Ok(Json(ConversationResponse {
        conversation_id: conversation.id,
        user1_id: conversation.user1_id,
        user2_id: conversation.user2_id,
        last_message_text: conversation.last_message_text,
        last_message_at: conversation.last_message_at,
    }))
}

/// List a user's conversations, newest activity first.
///
/// **Route**: `GET /api/chat/conversations/{user_id}`
///
/// Conversations with no messages yet sort last. Each entry carries the
/// counterpart's display name; a placeholder is used when the user row is
/// gone (deleted accounts keep their threads listable).
#[instrument(skip(db))]
pub async fn list_conversations(
    Path(user_id): Path<i64>,
    State(db): State<DbPool>,
) -> Result<Json<Vec<ConversationSummary>>> {
    validate_positive_id(user_id, "userId").map_err(AppError::InvalidInput)?;

    let conversations = ConversationRepository::list_for_user(&db, user_id).await?;

    let summaries = conversations
        .into_iter()
        .map(|row| ConversationSummary {
            id: row.id,
            other_user_id: row.other_user_id,
            other_user_name: row
                .other_user_name
                .unwrap_or_else(|| format!("User {}", row.other_user_id)),
            last_message: row.last_message,
            last_message_at: row.last_message_at,
        })
        .collect();

    Ok(Json(summaries))
}

/// Full message history of a conversation, earliest first.
///
/// **Route**: `GET /api/chat/messages/{conversation_id}`
#[instrument(skip(db))]
pub async fn list_messages(
    Path(conversation_id): Path<i64>,
    State(db): State<DbPool>,
) -> Result<Json<Vec<ChatMessage>>> {
    let conversation = ConversationRepository::find_by_id(&db, conversation_id).await?;
    if conversation.is_none() {
        return Err(AppError::NotFound(format!(
            "Conversation {} not found",
            conversation_id
        )));
    }

    let messages = MessageRepository::list_by_conversation(&db, conversation_id).await?;

    Ok(Json(messages.into_iter().map(to_wire).collect()))
}

/// Persist a message via the request/response path.
///
/// **Route**: `POST /api/chat/messages`
///
/// Fallback for clients without a live socket: the message is visible to
/// the next history fetch but no `receive_message` event fires. The summary
/// update is best-effort; its failure never rolls back the message write.
#[instrument(skip(db, config, payload))]
pub async fn send_message(
    State(db): State<DbPool>,
    State(config): State<Config>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<ChatMessage>> {
    let conversation_id = payload
        .conversation_id
        .ok_or_else(|| AppError::InvalidInput("conversationId is missing".to_string()))?;
    let from = payload
        .from
        .ok_or_else(|| AppError::InvalidInput("from is missing".to_string()))?;
    let to = payload
        .to
        .ok_or_else(|| AppError::InvalidInput("to is missing".to_string()))?;
    let text = payload
        .text
        .ok_or_else(|| AppError::InvalidInput("text is missing".to_string()))?;

    validate_max_length(&text, config.max_message_length, "text").map_err(AppError::InvalidInput)?;

    let conversation = ConversationRepository::find_by_id(&db, conversation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Conversation {} not found", conversation_id)))?;

    let stored = MessageRepository::append(&db, conversation.id, from, to, &text).await?;

    if let Err(err) =
        ConversationRepository::record_last_message(&db, conversation.id, &stored.text, stored.created_at)
            .await
    {
        warn!(
            conversation_id = conversation.id,
            error = %err,
            "Failed to update conversation summary"
        );
    }

    Ok(Json(to_wire(stored)))
}
