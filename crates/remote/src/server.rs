// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Every `submit` is answered with an `ack` once the entry is durably
//! recorded, including entries the client already delivered before.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use satchel_core::protocol::{ClientMessage, ServerMessage};

use crate::state::ServerState;

/// Run the WebSocket server on the given address.
pub async fn run(addr: SocketAddr, state: ServerState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    serve(listener, state)
        .await
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;
    Ok(())
}

/// Accepts connections from `listener` until accepting fails.
pub(crate) async fn serve(
    listener: TcpListener,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut ws = tokio_tungstenite::accept_async(stream).await?;
    info!("client connected: {}", peer_addr);

    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = handle_client_message(&text, &state).await;
                ws.send(Message::Text(response.to_json()?.into())).await?;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(data)) => ws.send(Message::Pong(data)).await?,
            Ok(_) => {}
            Err(e) => {
                warn!("websocket error from {}: {}", peer_addr, e);
                break;
            }
        }
    }

    info!("client disconnected: {}", peer_addr);
    Ok(())
}

/// Process one text frame and produce the reply.
pub(crate) async fn handle_client_message(text: &str, state: &ServerState) -> ServerMessage {
    let msg = match ClientMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("malformed frame: {}", e);
            return ServerMessage::error(format!("malformed message: {e}"));
        }
    };

    match msg {
        ClientMessage::Submit { client_id, entry } => match state.accept(&client_id, &entry).await {
            Ok(true) => {
                debug!("recorded {} entry {} from {}", entry.kind, entry.seq, client_id);
                ServerMessage::ack(entry.seq)
            }
            Ok(false) => {
                debug!("entry {} from {} already recorded", entry.seq, client_id);
                ServerMessage::ack(entry.seq)
            }
            Err(e) => {
                error!("failed to record entry {} from {}: {}", entry.seq, client_id, e);
                ServerMessage::error(format!("failed to record entry {}: {e}", entry.seq))
            }
        },
        ClientMessage::Ping { id } => ServerMessage::pong(id),
    }
}
