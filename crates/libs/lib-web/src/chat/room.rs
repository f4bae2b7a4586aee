//! # Realtime Room Router
//!
//! Maps participant-pair channels to broadcast groups and fans new-message
//! events out to every live subscriber of a channel.
//!
//! One `RoomRouter` exists per process, constructed at startup and injected
//! into handlers through `AppState`. It holds nothing but the channel →
//! sender table: per-connection bookkeeping (which rooms a socket joined,
//! forwarding tasks) lives with the connection itself, so a dying socket can
//! never strand state here. Channels whose last subscriber disconnected are
//! pruned to keep the table bounded by live pairs rather than historic ones.

use shared::dto::chat::ServerEvent;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Buffered events per channel before slow receivers start lagging.
const CHANNEL_CAPACITY: usize = 100;

/// Per-process registry of realtime chat channels.
pub struct RoomRouter {
    channels: RwLock<HashMap<String, broadcast::Sender<ServerEvent>>>,
}

impl RoomRouter {
    /// Create an empty router. Call once at startup.
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to a channel, creating its broadcast group on first join.
    ///
    /// Subscribing twice from the same connection is harmless: each call
    /// returns an independent receiver, and the caller's own join
    /// bookkeeping is what makes repeated joins no-ops.
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<ServerEvent> {
        let mut channels = self.channels.write().await;

        if let Some(sender) = channels.get(channel) {
            sender.subscribe()
        } else {
            let (tx, rx) = broadcast::channel(CHANNEL_CAPACITY);
            channels.insert(channel.to_string(), tx);
            debug!(channel = %channel, "Created chat channel");
            rx
        }
    }

    /// Broadcast an event to every subscriber of a channel.
    ///
    /// Best-effort: a channel nobody joined yet, or whose subscribers all
    /// disconnected, simply delivers to zero receivers. Returns the number
    /// of receivers the event was handed to.
    pub async fn broadcast(&self, channel: &str, event: ServerEvent) -> usize {
        let channels = self.channels.read().await;

        match channels.get(channel) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Number of live subscribers on a channel.
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drop a channel's broadcast group once its last subscriber is gone.
    ///
    /// Called by the socket teardown path for each channel the connection
    /// had joined. A channel that picked up new subscribers in the meantime
    /// is left alone.
    pub async fn prune(&self, channel: &str) {
        let mut channels = self.channels.write().await;

        let empty = channels
            .get(channel)
            .map(|sender| sender.receiver_count() == 0)
            .unwrap_or(false);
        if empty {
            channels.remove(channel);
            debug!(channel = %channel, "Pruned empty chat channel");
        }
    }

    /// Number of channels currently tracked.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for RoomRouter {
    fn default() -> Self {
        Self::new()
    }
}
