// src/api/ws.rs
//
// The websocket end of the push channel. Each connection declares who it is
// (`company_id`) and which chats it follows (`chats`, comma-separated ids) at
// connect time; the server forwards only events inside that scope.
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use axum::{routing::get, Router};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::app_state::AppState;
use crate::realtime::{ClientScope, RealtimeEvent};

pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub company_id: String,
    pub chats: Option<String>,
}

async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let scope = ClientScope::parse(query.company_id, query.chats.as_deref());
    let rx = state.events.subscribe();
    ws.on_upgrade(move |socket| client_session(socket, rx, scope))
}

async fn client_session(
    socket: WebSocket,
    mut rx: broadcast::Receiver<RealtimeEvent>,
    scope: ClientScope,
) {
    tracing::debug!(company_id = %scope.company_id, "websocket client connected");
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) if scope.wants(&event) => {
                    let Ok(payload) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // No replay on this channel; the client catches up via a
                    // full-history fetch.
                    tracing::warn!(company_id = %scope.company_id, missed, "websocket client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!(company_id = %scope.company_id, "websocket client disconnected");
}
