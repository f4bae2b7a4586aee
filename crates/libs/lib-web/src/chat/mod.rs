//! # Chat Module
//!
//! Realtime delivery for direct messaging between marketplace users.
//!
//! [`room`] owns the channel → subscriber mappings; [`gateway`] implements
//! the join/send/typing operations both transports share, keeping the
//! socket loop in `handlers::websocket` free of business logic.

pub mod gateway;
pub mod room;

pub use room::RoomRouter;
