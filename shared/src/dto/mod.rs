//! # Data Transfer Objects (DTOs)
//!
//! This module contains the data structures exchanged over the realtime
//! socket between client and backend.
//!
//! ## Serialization Format
//!
//! - **Envelope**: `{"type": "<event>", "data": {...}}` via serde's
//!   tag/content enum representation
//! - **Optional fields**: omitted when `None` using
//!   `#[serde(skip_serializing_if = "Option::is_none")]`
//! - **Timestamps**: RFC3339 UTC via chrono's serde support
//! - **All types**: implement both `Serialize` and `Deserialize`

pub mod chat;

pub use chat::*;
