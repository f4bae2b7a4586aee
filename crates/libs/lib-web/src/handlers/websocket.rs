//! # WebSocket Handlers
//!
//! HTTP endpoint for the realtime chat connection.
//!
//! ## Endpoints
//!
//! - `GET /api/ws/chat` - WebSocket connection speaking the chat event protocol
//!
//! Every frame is a JSON envelope (see [`shared::dto::chat`]). The
//! connection loop is a thin dispatcher: each inbound event is handled by
//! the corresponding [`crate::chat::gateway`] operation, and events for the
//! rooms this connection joined are forwarded from their broadcast
//! receivers into the socket by per-room tasks.
//!
//! There is no request/response on this path, so every per-event failure
//! (invalid pair, empty text, store error) is logged and the event dropped;
//! the connection itself stays up, and other sessions are never affected.

use crate::chat::gateway;
use crate::server::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use shared::dto::chat::{ClientEvent, ServerEvent};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outbound events buffered per connection before backpressure applies.
const OUTBOUND_BUFFER: usize = 64;

/// WebSocket handler for the realtime chat path.
///
/// **Route**: `GET /api/ws/chat`
///
/// # Example
///
/// ```javascript
/// const ws = new WebSocket('ws://localhost:4000/api/ws/chat');
/// ws.send(JSON.stringify({ type: 'join_room', data: { userId: 7, otherUserId: 3 } }));
/// ws.onmessage = (event) => {
///   const frame = JSON.parse(event.data);
///   if (frame.type === 'receive_message') console.log(frame.data.text);
/// };
/// ```
pub async fn chat_websocket(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    let client_id = Uuid::new_v4().to_string();

    info!(
        client_id = %client_id,
        client_ip = %addr.ip(),
        "[WS] Connection attempt"
    );

    ws.on_upgrade(move |socket| handle_chat_socket(socket, state, client_id, addr))
}

/// Drive one chat connection until it closes.
async fn handle_chat_socket(
    socket: WebSocket,
    state: AppState,
    client_id: String,
    addr: SocketAddr,
) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);

    info!(client_id = %client_id, client_ip = %addr.ip(), "[WS] Connected");

    // Writer task: everything this connection should see funnels through
    // one mpsc so room forwarders never touch the sink concurrently.
    let writer_client_id = client_id.clone();
    let mut send_task: JoinHandle<()> = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(client_id = %writer_client_id, error = %err, "[WS] Failed to serialize event");
                    continue;
                }
            };
            if let Err(err) = sink.send(Message::Text(json.into())).await {
                debug!(client_id = %writer_client_id, error = %err, "[WS] Send failed, closing writer");
                break;
            }
        }
    });

    // Channel name -> forwarder task for every room this connection joined.
    let mut joined: HashMap<String, JoinHandle<()>> = HashMap::new();

    loop {
        tokio::select! {
            maybe_msg = stream.next() => match maybe_msg {
                Some(Ok(Message::Text(text))) => {
                    handle_client_frame(&state, &out_tx, &mut joined, &client_id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!(client_id = %client_id, "[WS] Close received");
                    break;
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Binary(_))) => {
                    debug!(client_id = %client_id, "[WS] Ignoring binary frame");
                }
                Some(Err(err)) => {
                    warn!(client_id = %client_id, error = %err, "[WS] Receive error");
                    break;
                }
            },
            _ = &mut send_task => {
                debug!(client_id = %client_id, "[WS] Writer ended, closing connection");
                break;
            }
        }
    }

    // Teardown: stop forwarders and release this connection's
    // subscriptions so channels do not accumulate dead receivers.
    let room_count = joined.len();
    for (channel, task) in joined.drain() {
        task.abort();
        state.rooms.prune(&channel).await;
    }
    send_task.abort();

    info!(
        client_id = %client_id,
        client_ip = %addr.ip(),
        rooms = room_count,
        "[WS] Disconnected"
    );
}

/// Dispatch one inbound frame. Errors never escape this function.
async fn handle_client_frame(
    state: &AppState,
    out_tx: &mpsc::Sender<ServerEvent>,
    joined: &mut HashMap<String, JoinHandle<()>>,
    client_id: &str,
    frame: &str,
) {
    let event: ClientEvent = match serde_json::from_str(frame) {
        Ok(event) => event,
        Err(err) => {
            warn!(client_id = %client_id, error = %err, "[WS] Dropping malformed frame");
            return;
        }
    };

    match event {
        ClientEvent::JoinRoom(data) => {
            match gateway::join_room(&state.db, &state.rooms, data.user_id, data.other_user_id).await {
                Ok((channel, conversation_id, receiver)) => {
                    if joined.contains_key(&channel) {
                        debug!(client_id = %client_id, channel = %channel, "[WS] Already joined, ignoring");
                        return;
                    }
                    let task = tokio::spawn(forward_room_events(
                        receiver,
                        out_tx.clone(),
                        channel.clone(),
                        client_id.to_string(),
                    ));
                    joined.insert(channel.clone(), task);
                    info!(
                        client_id = %client_id,
                        channel = %channel,
                        conversation_id,
                        "[WS] Joined room"
                    );
                }
                Err(err) => {
                    warn!(client_id = %client_id, error = %err, "[WS] join_room failed");
                }
            }
        }
        ClientEvent::SendMessage(data) => {
            match gateway::send_message(&state.db, &state.rooms, &state.config, &data).await {
                Ok(message) => {
                    debug!(
                        client_id = %client_id,
                        message_id = message.id,
                        conversation_id = message.conversation_id,
                        "[WS] Message stored and broadcast"
                    );
                }
                Err(err) => {
                    warn!(client_id = %client_id, error = %err, "[WS] send_message failed");
                }
            }
        }
        ClientEvent::Typing(data) => {
            if let Err(err) = gateway::typing(&state.rooms, &data).await {
                debug!(client_id = %client_id, error = %err, "[WS] typing dropped");
            }
        }
    }
}

/// Forward one room's broadcast events into the connection's outbound queue.
///
/// Ends when the room's sender closes or the connection's writer is gone. A
/// lagged receiver skips the missed events and keeps going; the client
/// recovers them on its next history fetch.
async fn forward_room_events(
    mut receiver: broadcast::Receiver<ServerEvent>,
    out_tx: mpsc::Sender<ServerEvent>,
    channel: String,
    client_id: String,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if out_tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(
                    client_id = %client_id,
                    channel = %channel,
                    skipped,
                    "[WS] Receiver lagged, events dropped"
                );
            }
            Err(RecvError::Closed) => break,
        }
    }
}
