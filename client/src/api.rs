//! # Chat API Client
//!
//! HTTP client methods for the chat REST surface: conversation bootstrap,
//! conversation listing, history fetch, and the fallback send path used
//! when the realtime socket is down.

use crate::error::ClientError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::dto::chat::ChatMessage;

/// Response of the conversation bootstrap call.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationHandle {
    #[serde(rename = "conversationId")]
    pub conversation_id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub last_message_text: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// One element of the conversation listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationEntry {
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

impl ConversationEntry {
    /// One-line preview of the last message for list rendering.
    pub fn preview(&self, max_chars: usize) -> String {
        shared::utils::preview_text(&self.last_message, max_chars)
    }
}

#[derive(Debug, Serialize)]
struct ConversationRequest {
    #[serde(rename = "userId")]
    user_id: i64,
    #[serde(rename = "otherUserId")]
    other_user_id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    #[serde(rename = "conversationId")]
    conversation_id: i64,
    from: i64,
    to: i64,
    text: &'a str,
}

/// HTTP client for communicating with the chat backend.
///
/// Maintains a connection pool; cheap to clone per call site.
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against a base URL such as
    /// `http://localhost:4000`.
    ///
    /// The client is configured with a 10 second timeout to prevent a hung
    /// backend from freezing the UI.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The WebSocket URL corresponding to this client's base URL.
    pub fn ws_url(&self) -> String {
        self.base_url
            .replace("http://", "ws://")
            .replace("https://", "wss://")
            + "/api/ws/chat"
    }

    async fn check<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Parse(e.to_string()))
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Get or create the conversation with another user.
    pub async fn bootstrap_conversation(
        &self,
        user_id: i64,
        other_user_id: i64,
    ) -> Result<ConversationHandle, ClientError> {
        let url = format!("{}/api/chat/conversation", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ConversationRequest { user_id, other_user_id })
            .send()
            .await?;

        Self::check(response).await
    }

    /// List the user's conversations, newest activity first.
    pub async fn list_conversations(
        &self,
        user_id: i64,
    ) -> Result<Vec<ConversationEntry>, ClientError> {
        let url = format!("{}/api/chat/conversations/{}", self.base_url, user_id);

        let response = self.client.get(&url).send().await?;

        Self::check(response).await
    }

    /// Fetch the full message history of a conversation, earliest first.
    pub async fn fetch_messages(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        let url = format!("{}/api/chat/messages/{}", self.base_url, conversation_id);

        let response = self.client.get(&url).send().await?;

        Self::check(response).await
    }

    /// Persist a message over REST.
    ///
    /// Fallback for when the realtime socket is down: the backend stores the
    /// message but emits no live event, so the UI should append the returned
    /// record locally instead of waiting for an echo.
    pub async fn send_message_fallback(
        &self,
        conversation_id: i64,
        from: i64,
        to: i64,
        text: &str,
    ) -> Result<ChatMessage, ClientError> {
        let url = format!("{}/api/chat/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest { conversation_id, from, to, text })
            .send()
            .await?;

        Self::check(response).await
    }
}
