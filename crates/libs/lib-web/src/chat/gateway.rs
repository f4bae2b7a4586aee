//! # Chat Gateway Operations
//!
//! The join/send/typing operations behind the realtime path, written as
//! plain functions of (payload, stores, router) so the socket loop stays a
//! thin event dispatcher. The REST handlers reuse the same stores but go
//! through `handlers::chat` instead: the REST send path deliberately does
//! NOT broadcast (see DESIGN.md).

use crate::chat::room::RoomRouter;
use lib_core::error::Result;
use lib_core::model::pair::PairKey;
use lib_core::model::store::models::StoredMessage;
use lib_core::model::store::{ConversationRepository, MessageRepository};
use lib_core::{AppError, Config, DbPool};
use lib_utils::validation::validate_max_length;
use shared::dto::chat::{ChatMessage, SendMessageData, ServerEvent, TypingData};
use tokio::sync::broadcast;
use tracing::warn;

/// Convert a stored row into its wire representation.
pub fn to_wire(message: StoredMessage) -> ChatMessage {
    ChatMessage {
        id: message.id,
        conversation_id: message.conversation_id,
        from_user_id: message.from_user_id,
        to_user_id: message.to_user_id,
        text: message.text,
        created_at: message.created_at,
    }
}

/// Subscribe a connection to the pair's channel.
///
/// Ensures the conversation exists first (first join lazily creates it),
/// then returns the channel name and a fresh broadcast receiver. The caller
/// owns idempotence: a connection already subscribed to the channel should
/// not call this again.
pub async fn join_room(
    db: &DbPool,
    rooms: &RoomRouter,
    user_id: i64,
    other_user_id: i64,
) -> Result<(String, i64, broadcast::Receiver<ServerEvent>)> {
    let pair = PairKey::new(user_id, other_user_id)?;

    let conversation = ConversationRepository::get_or_create(db, pair).await?;

    let channel = pair.channel();
    let receiver = rooms.subscribe(&channel).await;

    Ok((channel, conversation.id, receiver))
}

/// Persist a message and broadcast it to the pair's channel.
///
/// Order matters: the row is durably stored before anything is emitted, so
/// a subscriber can trust every `receive_message` it sees. The summary
/// update is a cache refresh only; its failure is logged and does not block
/// delivery. The broadcast includes the sender's own connection, which is
/// what the sending UI renders (no optimistic local insert).
pub async fn send_message(
    db: &DbPool,
    rooms: &RoomRouter,
    config: &Config,
    data: &SendMessageData,
) -> Result<ChatMessage> {
    let pair = PairKey::new(data.from, data.to)?;

    validate_max_length(&data.text, config.max_message_length, "text")
        .map_err(AppError::InvalidInput)?;

    // The client may echo back a conversationId from its bootstrap; the
    // pair is authoritative, so a stale or forged id cannot cross-post.
    let conversation = ConversationRepository::get_or_create(db, pair).await?;

    let stored =
        MessageRepository::append(db, conversation.id, data.from, data.to, &data.text).await?;

    if let Err(err) =
        ConversationRepository::record_last_message(db, conversation.id, &stored.text, stored.created_at)
            .await
    {
        warn!(
            conversation_id = conversation.id,
            error = %err,
            "Failed to update conversation summary"
        );
    }

    let message = to_wire(stored);
    rooms
        .broadcast(&pair.channel(), ServerEvent::ReceiveMessage(message.clone()))
        .await;

    Ok(message)
}

/// Relay an ephemeral typing notice to the pair's channel.
///
/// Never persisted; best-effort.
pub async fn typing(rooms: &RoomRouter, data: &TypingData) -> Result<()> {
    let pair = PairKey::new(data.from, data.to)?;

    rooms
        .broadcast(&pair.channel(), ServerEvent::Typing(*data))
        .await;

    Ok(())
}
