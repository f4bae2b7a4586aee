//! # WebSocket Client for Realtime Chat
//!
//! Handles the WebSocket connection to the backend chat endpoint: typed
//! outbound events, typed inbound events on an `async-channel`, and
//! automatic reconnection with bounded backoff.
//!
//! The embedding UI holds a [`ChatSocket`] and an event receiver; the
//! connection task lives on the tokio runtime and survives transient
//! disconnects by reconnecting (rooms must be re-joined after a reconnect,
//! which [`crate::session::ChatSession`] takes care of).

use crate::error::ClientError;
use async_channel::{Receiver, Sender};
use futures_util::{SinkExt, StreamExt};
use shared::dto::chat::{ClientEvent, ServerEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Maximum number of connection attempts before giving up.
const MAX_CONNECTION_ATTEMPTS: u32 = 5;
/// Upper bound for the reconnect backoff.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Events surfaced to the embedding UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// The connection is up (fires again after each reconnect; the session
    /// re-joins its room on every one of these).
    Connected,
    /// The connection dropped; a reconnect attempt follows unless the
    /// attempt budget is exhausted.
    Disconnected,
    /// A server event arrived.
    Server(ServerEvent),
    /// The socket gave up reconnecting.
    Closed,
}

/// Handle to the realtime chat connection.
pub struct ChatSocket {
    outbound: mpsc::Sender<ClientEvent>,
}

impl ChatSocket {
    /// Connect to `ws_url` and return the socket handle plus the event
    /// receiver the UI should drain.
    pub fn connect(ws_url: String) -> (Self, Receiver<SocketEvent>) {
        let (event_tx, event_rx) = async_channel::bounded(256);
        let (outbound_tx, outbound_rx) = mpsc::channel(64);

        tokio::spawn(run_connection(ws_url, event_tx, outbound_rx));

        (Self { outbound: outbound_tx }, event_rx)
    }

    /// Queue an event for the server.
    pub async fn send(&self, event: ClientEvent) -> Result<(), ClientError> {
        self.outbound
            .send(event)
            .await
            .map_err(|_| ClientError::Socket("Connection task is gone".to_string()))
    }
}

/// Connection loop: connect, pump frames both ways, reconnect on drop.
async fn run_connection(
    ws_url: String,
    event_tx: Sender<SocketEvent>,
    mut outbound_rx: mpsc::Receiver<ClientEvent>,
) {
    let mut reconnect_delay = Duration::from_secs(1);
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        info!(url = %ws_url, attempt = attempts, "Connecting to chat WebSocket");

        let (mut stream, mut sink_alive) = match connect_async(ws_url.as_str()).await {
            Ok((stream, _)) => {
                attempts = 0;
                reconnect_delay = Duration::from_secs(1);
                let _ = event_tx.send(SocketEvent::Connected).await;
                (stream, true)
            }
            Err(err) => {
                warn!(url = %ws_url, error = %err, "WebSocket connect failed");
                if attempts >= MAX_CONNECTION_ATTEMPTS {
                    warn!("Giving up on chat WebSocket after {} attempts", attempts);
                    let _ = event_tx.send(SocketEvent::Closed).await;
                    return;
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
                continue;
            }
        };

        while sink_alive {
            tokio::select! {
                maybe_out = outbound_rx.recv() => match maybe_out {
                    Some(event) => {
                        let frame = match serde_json::to_string(&event) {
                            Ok(frame) => frame,
                            Err(err) => {
                                warn!(error = %err, "Failed to serialize client event");
                                continue;
                            }
                        };
                        if let Err(err) = stream.send(Message::Text(frame.into())).await {
                            warn!(error = %err, "WebSocket send failed");
                            sink_alive = false;
                        }
                    }
                    None => {
                        // Socket handle dropped; shut down cleanly.
                        let _ = stream.close(None).await;
                        let _ = event_tx.send(SocketEvent::Closed).await;
                        return;
                    }
                },
                maybe_in = stream.next() => match maybe_in {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(text.as_ref()) {
                            Ok(event) => {
                                if event_tx.send(SocketEvent::Server(event)).await.is_err() {
                                    // UI stopped listening.
                                    let _ = stream.close(None).await;
                                    return;
                                }
                            }
                            Err(err) => {
                                debug!(error = %err, "Ignoring unparseable server frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Chat WebSocket closed by server");
                        sink_alive = false;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, "WebSocket receive error");
                        sink_alive = false;
                    }
                },
            }
        }

        let _ = event_tx.send(SocketEvent::Disconnected).await;
        sleep(reconnect_delay).await;
        reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
    }
}
