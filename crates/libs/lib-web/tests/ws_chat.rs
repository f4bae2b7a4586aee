//! End-to-end tests for the realtime chat path: a real server on an
//! ephemeral port, real WebSocket clients, and the REST surface alongside.

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use lib_core::{Config, DbPool};
use lib_web::server::{create_router, AppState};
use shared::dto::chat::{ClientEvent, SendMessageData, ServerEvent, TypingData};
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    for ddl in [
        r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        r#"
        CREATE TABLE conversations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user1_id INTEGER NOT NULL,
            user2_id INTEGER NOT NULL,
            last_message_text TEXT,
            last_message_at TIMESTAMP,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(user1_id, user2_id),
            CHECK(user1_id < user2_id)
        )
        "#,
        r#"
        CREATE TABLE messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id INTEGER NOT NULL REFERENCES conversations(id),
            from_user_id INTEGER NOT NULL,
            to_user_id INTEGER NOT NULL,
            text TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ] {
        sqlx::query(ddl).execute(&pool).await.expect("Failed to create table");
    }

    pool
}

/// Start the app on an ephemeral port; returns its address and state.
async fn spawn_server() -> (SocketAddr, AppState) {
    let pool = test_pool().await;
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        max_message_length: 10000,
    };
    let state = AppState::new(pool, config);
    let app: Router = create_router(state.clone(), vec![]);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (addr, state)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (client, _) = connect_async(format!("ws://{}/api/ws/chat", addr))
        .await
        .expect("Failed to connect websocket");
    client
}

async fn send_event(client: &mut WsClient, event: &ClientEvent) {
    let frame = serde_json::to_string(event).unwrap();
    client.send(Message::Text(frame.into())).await.unwrap();
}

async fn join(client: &mut WsClient, user_id: i64, other_user_id: i64) {
    send_event(
        client,
        &ClientEvent::JoinRoom(shared::dto::chat::JoinRoomData { user_id, other_user_id }),
    )
    .await;
}

/// Read frames until a `ServerEvent` parses, failing after two seconds.
async fn next_event(client: &mut WsClient) -> ServerEvent {
    timeout(Duration::from_secs(2), async {
        loop {
            match client.next().await.expect("connection closed") {
                Ok(Message::Text(text)) => {
                    return serde_json::from_str::<ServerEvent>(text.as_ref())
                        .expect("unparseable server frame");
                }
                Ok(_) => continue,
                Err(err) => panic!("websocket error: {}", err),
            }
        }
    })
    .await
    .expect("timed out waiting for server event")
}

/// Wait until `check` returns true, failing after two seconds.
async fn wait_for<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    timeout(Duration::from_secs(2), async {
        loop {
            if check().await {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn message_is_broadcast_to_all_subscribers_including_sender() {
    let (addr, state) = spawn_server().await;

    let mut sender = connect(addr).await;
    let mut receiver = connect(addr).await;

    join(&mut sender, 3, 7).await;
    join(&mut receiver, 7, 3).await;
    wait_for(|| {
        let rooms = state.rooms.clone();
        async move { rooms.subscriber_count("chat_3_7").await == 2 }
    })
    .await;

    send_event(
        &mut sender,
        &ClientEvent::SendMessage(SendMessageData {
            conversation_id: None,
            from: 3,
            to: 7,
            text: "Hola!".to_string(),
        }),
    )
    .await;

    for client in [&mut sender, &mut receiver] {
        match next_event(client).await {
            ServerEvent::ReceiveMessage(msg) => {
                assert_eq!(msg.from_user_id, 3);
                assert_eq!(msg.to_user_id, 7);
                assert_eq!(msg.text, "Hola!");
                assert!(msg.id > 0);
            }
            other => panic!("expected receive_message, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn message_sent_live_appears_in_rest_history() {
    let (addr, state) = spawn_server().await;

    let mut client = connect(addr).await;
    join(&mut client, 3, 7).await;
    wait_for(|| {
        let rooms = state.rooms.clone();
        async move { rooms.subscriber_count("chat_3_7").await == 1 }
    })
    .await;

    send_event(
        &mut client,
        &ClientEvent::SendMessage(SendMessageData {
            conversation_id: None,
            from: 3,
            to: 7,
            text: "Hola!".to_string(),
        }),
    )
    .await;
    let echoed = match next_event(&mut client).await {
        ServerEvent::ReceiveMessage(msg) => msg,
        other => panic!("expected receive_message, got {:?}", other),
    };

    let history: Vec<serde_json::Value> =
        reqwest_get(addr, &format!("/api/chat/messages/{}", echoed.conversation_id)).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"].as_i64().unwrap(), echoed.id);
    assert_eq!(history[0]["text"], "Hola!");
}

#[tokio::test]
async fn empty_text_is_dropped_silently() {
    let (addr, state) = spawn_server().await;

    let mut client = connect(addr).await;
    join(&mut client, 3, 7).await;
    wait_for(|| {
        let rooms = state.rooms.clone();
        async move { rooms.subscriber_count("chat_3_7").await == 1 }
    })
    .await;

    // Whitespace-only text: no broadcast, no stored row, connection lives.
    send_event(
        &mut client,
        &ClientEvent::SendMessage(SendMessageData {
            conversation_id: None,
            from: 3,
            to: 7,
            text: "   ".to_string(),
        }),
    )
    .await;
    // A valid follow-up is the only event that arrives.
    send_event(
        &mut client,
        &ClientEvent::SendMessage(SendMessageData {
            conversation_id: None,
            from: 3,
            to: 7,
            text: "sigue vivo".to_string(),
        }),
    )
    .await;

    match next_event(&mut client).await {
        ServerEvent::ReceiveMessage(msg) => assert_eq!(msg.text, "sigue vivo"),
        other => panic!("expected receive_message, got {:?}", other),
    }
}

#[tokio::test]
async fn typing_is_relayed_to_the_counterpart() {
    let (addr, state) = spawn_server().await;

    let mut typist = connect(addr).await;
    let mut watcher = connect(addr).await;
    join(&mut typist, 3, 7).await;
    join(&mut watcher, 7, 3).await;
    wait_for(|| {
        let rooms = state.rooms.clone();
        async move { rooms.subscriber_count("chat_3_7").await == 2 }
    })
    .await;

    send_event(&mut typist, &ClientEvent::Typing(TypingData { from: 3, to: 7 })).await;

    assert_eq!(
        next_event(&mut watcher).await,
        ServerEvent::Typing(TypingData { from: 3, to: 7 })
    );
}

#[tokio::test]
async fn disconnect_releases_subscriptions() {
    let (addr, state) = spawn_server().await;

    let mut first = connect(addr).await;
    let second = connect(addr).await;
    join(&mut first, 3, 7).await;
    wait_for(|| {
        let rooms = state.rooms.clone();
        async move { rooms.subscriber_count("chat_3_7").await == 1 }
    })
    .await;

    drop(second); // never joined; closing it must not disturb the room
    drop(first);
    wait_for(|| {
        let rooms = state.rooms.clone();
        async move { rooms.channel_count().await == 0 }
    })
    .await;
}

/// GET a JSON array from the spawned server.
async fn reqwest_get(addr: SocketAddr, path: &str) -> Vec<serde_json::Value> {
    reqwest::get(format!("http://{}{}", addr, path))
        .await
        .expect("request failed")
        .json()
        .await
        .expect("response body is not a JSON array")
}
