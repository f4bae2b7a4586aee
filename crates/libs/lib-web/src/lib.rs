//! # Web Library
//!
//! HTTP handlers, middleware, realtime chat routing, and server setup.

pub mod handlers;
pub mod middleware;
pub mod chat;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use server::{start_server, ServerConfig, AppState};
