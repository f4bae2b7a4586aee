//! # HTTP Request Handlers
//!
//! This module contains all Axum HTTP request handlers organized by feature domain.
//!
//! ## Handler Modules
//!
//! - **[`chat`]**: Conversation bootstrap, listing, and message history/send
//!   - `POST /api/chat/conversation` - Get or create the conversation for a pair
//!   - `GET /api/chat/conversations/{user_id}` - List a user's conversations
//!   - `GET /api/chat/messages/{conversation_id}` - Full message history
//!   - `POST /api/chat/messages` - Fallback send (no live broadcast)
//!
//! - **[`websocket`]**: The realtime push path
//!   - `GET /api/ws/chat` - WebSocket connection speaking the
//!     `join_room`/`send_message`/`typing`/`receive_message` event protocol
//!
//! ## Handler Architecture
//!
//! All handlers follow Axum's extractor pattern:
//!
//! ```rust,ignore
//! async fn handler(
//!     State(db): State<DbPool>,              // Shared state
//!     Json(payload): Json<RequestBody>,      // Request body
//! ) -> Result<Json<Response>, AppError> {
//!     // Handler logic...
//!     Ok(Json(response))
//! }
//! ```
//!
//! ## Error Handling
//!
//! Handlers return `Result<T, AppError>`; `AppError::into_response` maps
//! the taxonomy onto status codes (400 for invalid pairs/input/empty text,
//! 404 for unknown conversations, 500 for store failures) with a JSON
//! `{error, code}` body. The websocket handler answers nothing: push-path
//! errors are logged and the event dropped.

pub mod chat;
pub mod websocket;
