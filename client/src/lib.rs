//! # Chat Client Library
//!
//! Client-side chat session orchestration for an embedding UI.
//!
//! A chat box needs three things glued together in the right order: join the
//! realtime room, bootstrap (or recover) the conversation over REST, then
//! fetch history and merge it with whatever live events already arrived.
//! [`session::ChatSession`] owns that ordering; [`api::ApiClient`] and
//! [`socket::ChatSocket`] are the two transports underneath it.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── api.rs      - REST calls (bootstrap, listing, history, fallback send)
//! ├── socket.rs   - WebSocket connection with reconnect and typed events
//! ├── session.rs  - per-conversation orchestration and message merging
//! └── error.rs    - client error type
//! ```
//!
//! ## Delivery model
//!
//! The sending UI renders its own messages from the server's broadcast echo,
//! not from an optimistic local insert: the echo carries the server-assigned
//! id and timestamp, which keeps ordering identical for every participant.

pub mod api;
pub mod error;
pub mod session;
pub mod socket;

pub use api::ApiClient;
pub use error::ClientError;
pub use session::{ChatSession, SessionEvent, SessionState};
pub use socket::{ChatSocket, SocketEvent};
