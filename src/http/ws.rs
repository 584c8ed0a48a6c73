//! WebSocket transport for the session adapter (component E). This is the
//! thin, I/O-driving half of the session: it owns frame parsing and the
//! outbound writer loop, and defers every decision about broker state to
//! [`crate::broker::session::dispatch`], which is pure and unit-tested on
//! its own.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::broker::{Broker, InboundEnvelope, SessionCommand, session};
use crate::core::constants::SESSION_CHANNEL_CAPACITY;

pub async fn handler(ws: WebSocketUpgrade, State(broker): State<Arc<Broker>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_session(socket, broker))
}

/// Drive one connection end to end: register it, spawn the writer loop that
/// drains its outbound channel to the socket, and read inbound frames until
/// the client disconnects or sends a close frame. Either direction ending
/// always falls through to `handle_disconnect`.
async fn run_session(socket: WebSocket, broker: Arc<Broker>) {
    let conn_id = broker.next_connection_id();
    let (tx, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
    broker.register_connection(conn_id, tx);

    let (sink, mut stream) = socket.split();
    let writer = tokio::spawn(writer_loop(sink, rx));

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<InboundEnvelope>(&text) {
                Ok(envelope) => session::dispatch(&broker, conn_id, envelope),
                Err(err) => session::dispatch_malformed(&broker, conn_id, err.to_string()),
            },
            Message::Close(_) => break,
            // Binary/Ping/Pong carry no envelope semantics in this protocol.
            _ => {}
        }
    }

    writer.abort();
    broker.handle_disconnect(conn_id);
}

/// Drain `rx` to the socket. `Close` tears down the sink and ends the loop;
/// a send failure (client already gone) ends it too — best-effort, never
/// retried.
async fn writer_loop(
    mut sink: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<SessionCommand>,
) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            SessionCommand::Send(envelope) => {
                let Ok(text) = serde_json::to_string(&*envelope) else {
                    tracing::error!("failed to serialize outbound envelope");
                    continue;
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            SessionCommand::Close => {
                let _ = sink.close().await;
                break;
            }
        }
    }
}
