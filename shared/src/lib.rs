//! # Shared Data Transfer Objects Library
//!
//! This library defines the realtime chat wire contract between the client
//! and the backend. All DTOs use JSON serialization via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for the socket event protocol
//!   - **[`dto::chat`]**: chat events and message records
//! - **[`utils`]**: Shared utility functions
//!   - **[`utils::preview_text`]**: Truncate message text for list previews
//!
//! ## Wire Format
//!
//! Every socket frame is a JSON envelope `{"type": ..., "data": ...}` where
//! `type` names the event (`join_room`, `send_message`, `typing`,
//! `receive_message`) and `data` carries the event payload. Payload field
//! spellings follow the original API contract (camelCase for join payloads,
//! snake_case for message records).
//!
//! ## Usage in Backend
//!
//! ```rust
//! use shared::dto::chat::ClientEvent;
//!
//! let frame = r#"{"type":"typing","data":{"from":3,"to":7}}"#;
//! let event: ClientEvent = serde_json::from_str(frame).unwrap();
//! assert!(matches!(event, ClientEvent::Typing(_)));
//! ```

pub mod dto;
pub mod utils;

// Re-export commonly used types for convenience
// Note: Wildcard re-exports are used here since shared is a DTO library
// where all exports are meant to be public API
pub use dto::*;
pub use utils::*;
