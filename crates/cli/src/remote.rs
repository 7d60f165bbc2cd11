// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket implementation of [`Remote`].
//!
//! Connects lazily on the first submission and reuses the connection until
//! it breaks. Each entry is sent as a `submit` frame and is considered
//! accepted once the server acks its `seq`.

use futures_util::{SinkExt, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use satchel_core::protocol::{ClientMessage, ServerMessage};
use satchel_core::{Remote, RemoteError, RemoteResult, SyncEntry};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

pub struct WebSocketRemote {
    url: String,
    client_id: String,
    ack_timeout: Duration,
    ws: Option<WsStream>,
}

impl WebSocketRemote {
    pub fn new(url: impl Into<String>, client_id: impl Into<String>, ack_timeout: Duration) -> Self {
        WebSocketRemote {
            url: url.into(),
            client_id: client_id.into(),
            ack_timeout,
            ws: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.ws.is_some()
    }

    async fn connection(&mut self) -> RemoteResult<&mut WsStream> {
        if self.ws.is_none() {
            debug!("connecting to {}", self.url);
            let (stream, _) = tokio_tungstenite::connect_async(self.url.as_str())
                .await
                .map_err(|e| RemoteError::ConnectionFailed(e.to_string()))?;
            self.ws = Some(stream);
        }
        self.ws.as_mut().ok_or(RemoteError::ConnectionClosed)
    }

    async fn submit_entry(&mut self, entry: &SyncEntry) -> RemoteResult<()> {
        let frame = ClientMessage::submit(self.client_id.clone(), entry.clone())
            .to_json()
            .map_err(|e| RemoteError::Protocol(e.to_string()))?;
        let timeout = self.ack_timeout;

        let ws = self.connection().await?;
        if let Err(e) = ws.send(Message::Text(frame.into())).await {
            self.ws = None;
            return Err(RemoteError::ConnectionFailed(e.to_string()));
        }

        let outcome = match tokio::time::timeout(timeout, await_ack(ws, entry.seq)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RemoteError::ConnectionFailed(format!(
                "no ack for entry {} within {}s",
                entry.seq,
                timeout.as_secs()
            ))),
        };
        // A rejection leaves the connection usable; anything else drops it.
        if matches!(&outcome, Err(e) if !matches!(e, RemoteError::Rejected(_))) {
            self.ws = None;
        }
        outcome
    }
}

async fn await_ack(ws: &mut WsStream, seq: i64) -> RemoteResult<()> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => match ServerMessage::from_json(&text) {
                Ok(ServerMessage::Ack { seq: acked }) if acked == seq => return Ok(()),
                Ok(ServerMessage::Ack { seq: acked }) => {
                    debug!("ignoring stale ack for {acked} while waiting for {seq}");
                }
                Ok(ServerMessage::Pong { .. }) => {}
                Ok(ServerMessage::Error { message }) => return Err(RemoteError::Rejected(message)),
                Err(e) => return Err(RemoteError::Protocol(e.to_string())),
            },
            Some(Ok(Message::Close(_))) | None => return Err(RemoteError::ConnectionClosed),
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(RemoteError::ConnectionFailed(e.to_string())),
        }
    }
}

impl Remote for WebSocketRemote {
    fn submit<'a>(
        &'a mut self,
        entry: &'a SyncEntry,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + 'a>> {
        Box::pin(self.submit_entry(entry))
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
