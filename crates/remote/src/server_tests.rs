// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test server on a random port, driven through real WebSocket clients.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::net::SocketAddr;
use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use satchel_core::protocol::{ClientMessage, ServerMessage};
use satchel_core::{SyncEntry, SyncKind};

use crate::server;
use crate::state::ServerState;

type Client =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    state: ServerState,
    _temp_dir: tempfile::TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let state = ServerState::new(temp_dir.path()).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let serving = state.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = server::serve(listener, serving) => {
                    if let Err(e) = result {
                        eprintln!("test server error: {}", e);
                    }
                }
                _ = shutdown_rx => {}
            }
        });

        TestServer {
            addr,
            shutdown_tx,
            state,
            _temp_dir: temp_dir,
        }
    }

    async fn connect(&self) -> Client {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", self.addr))
            .await
            .unwrap();
        ws
    }

    fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn entry(seq: i64) -> SyncEntry {
    SyncEntry {
        seq,
        kind: SyncKind::Progress,
        payload: json!({ "userId": "u1", "lessonId": "l1", "completionStatus": "completed" }),
        enqueued_at: Utc::now(),
    }
}

async fn send_text(ws: &mut Client, text: String) -> ServerMessage {
    ws.send(Message::Text(text.into())).await.unwrap();
    match timeout(Duration::from_secs(5), ws.next()).await {
        Ok(Some(Ok(Message::Text(reply)))) => ServerMessage::from_json(&reply).unwrap(),
        other => unreachable!("expected a text reply, got {:?}", other),
    }
}

async fn request(ws: &mut Client, msg: ClientMessage) -> ServerMessage {
    send_text(ws, msg.to_json().unwrap()).await
}

#[tokio::test]
async fn submit_is_acked_and_recorded() {
    let server = TestServer::start().await;
    let mut ws = server.connect().await;

    let reply = request(&mut ws, ClientMessage::submit("c-1", entry(1))).await;
    assert_eq!(reply, ServerMessage::ack(1));

    let received = server.state.received().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].client_id, "c-1");
    assert_eq!(received[0].entry.seq, 1);
    assert_eq!(received[0].entry.payload["lessonId"], "l1");
    server.shutdown();
}

#[tokio::test]
async fn resubmission_is_acked_but_not_recorded_twice() {
    let server = TestServer::start().await;
    let mut ws = server.connect().await;

    assert_eq!(
        request(&mut ws, ClientMessage::submit("c-1", entry(4))).await,
        ServerMessage::ack(4)
    );
    assert_eq!(
        request(&mut ws, ClientMessage::submit("c-1", entry(4))).await,
        ServerMessage::ack(4)
    );
    assert_eq!(server.state.received_count().await, 1);
    server.shutdown();
}

#[tokio::test]
async fn clients_are_deduplicated_separately() {
    let server = TestServer::start().await;
    let mut a = server.connect().await;
    let mut b = server.connect().await;

    request(&mut a, ClientMessage::submit("c-a", entry(1))).await;
    request(&mut b, ClientMessage::submit("c-b", entry(1))).await;

    assert_eq!(server.state.received_count().await, 2);
    server.shutdown();
}

#[tokio::test]
async fn ping_gets_pong() {
    let server = TestServer::start().await;
    let mut ws = server.connect().await;

    assert_eq!(request(&mut ws, ClientMessage::ping(42)).await, ServerMessage::pong(42));
    server.shutdown();
}

#[tokio::test]
async fn malformed_frame_gets_error_and_connection_survives() {
    let server = TestServer::start().await;
    let mut ws = server.connect().await;

    let reply = send_text(&mut ws, "{\"type\":\"bogus\"}".to_string()).await;
    assert!(matches!(reply, ServerMessage::Error { ref message } if message.contains("malformed")));

    let reply = request(&mut ws, ClientMessage::submit("c-1", entry(2))).await;
    assert_eq!(reply, ServerMessage::ack(2));
    server.shutdown();
}

#[tokio::test]
async fn log_survives_restart() {
    let temp_dir = tempfile::tempdir().unwrap();
    {
        let state = ServerState::new(temp_dir.path()).unwrap();
        assert!(state.accept("c-1", &entry(1)).await.unwrap());
    }

    let state = ServerState::new(temp_dir.path()).unwrap();
    assert_eq!(state.received_count().await, 1);
    assert!(!state.accept("c-1", &entry(1)).await.unwrap());
    assert!(temp_dir.path().join("received.jsonl").exists());
}

#[tokio::test]
async fn handles_client_message_directly() {
    let temp_dir = tempfile::tempdir().unwrap();
    let state = ServerState::new(temp_dir.path()).unwrap();

    let text = ClientMessage::submit("c-1", entry(9)).to_json().unwrap();
    assert_eq!(server::handle_client_message(&text, &state).await, ServerMessage::ack(9));
    assert!(matches!(
        server::handle_client_message("[]", &state).await,
        ServerMessage::Error { .. }
    ));
}
