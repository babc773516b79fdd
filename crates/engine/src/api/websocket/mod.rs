//! WebSocket handling for player connections.
//!
//! The upgrade is refused with 401 unless the request carries a valid bearer
//! token. Each socket then runs one receive loop: a command is handled to
//! completion before the next frame is read, so a player's commands never
//! interleave on one connection.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use hexrealm_domain::{ConnectionId, User};
use hexrealm_shared::{ClientMessage, ServerMessage};

use super::connections::ConnectionManager;
use crate::app::App;
use crate::use_cases::Reply;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub app: Arc<App>,
    pub connections: Arc<ConnectionManager>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

/// `Authorization: Bearer <token>` wins over `?token=`.
fn bearer_token(headers: &HeaderMap, query: &TokenQuery) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| query.token.clone())
        .filter(|token| !token.is_empty())
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsState>>,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
) -> Response {
    let Some(token) = bearer_token(&headers, &query) else {
        return (StatusCode::UNAUTHORIZED, "Missing bearer token").into_response();
    };
    let user = match state.app.use_cases.auth.verify_token(&token).await {
        Ok(Some(user)) => user,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "Invalid token").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Token lookup failed");
            return (StatusCode::SERVICE_UNAVAILABLE, "Try again later").into_response();
        }
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>, user: User) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let connection_id = ConnectionId::new();
    let user_id = user.id;

    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);
    state
        .connections
        .register(connection_id, user_id, tx.clone())
        .await;
    tracing::info!(%connection_id, %user_id, "WebSocket connection established");

    // Spawn a task to forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to encode server message"),
            }
        }
    });

    let greeting = match state.app.use_cases.session.connect(&user).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(%user_id, error = %e, "Failed to build session greeting");
            Reply::with_error("Your world could not be loaded. Try reconnecting.")
        }
    };
    deliver(&tx, greeting).await;

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let reply = match ClientMessage::parse(text.as_str()) {
                    Ok(msg) => handle_message(msg, &state, user_id, connection_id).await,
                    Err(e) => {
                        tracing::debug!(%connection_id, error = %e, "Failed to parse message");
                        Reply::with_error(format!("Invalid message: {e}"))
                    }
                };
                deliver(&tx, reply).await;
            }
            Ok(Message::Close(_)) => {
                tracing::info!(%connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::warn!(%connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    if let Some((user_id, remaining)) = state.connections.unregister(connection_id).await {
        state
            .app
            .use_cases
            .session
            .disconnect(user_id, connection_id, remaining)
            .await;
    }
    send_task.abort();
    tracing::info!(%connection_id, "WebSocket connection terminated");
}

async fn handle_message(
    msg: ClientMessage,
    state: &WsState,
    user_id: hexrealm_domain::UserId,
    connection_id: ConnectionId,
) -> Reply {
    let dispatcher = &state.app.use_cases.dispatcher;
    match msg {
        ClientMessage::CmdInput { raw } => dispatcher.dispatch(user_id, connection_id, &raw).await,
        ClientMessage::CombatRetreat => dispatcher.retreat(user_id).await,
    }
}

async fn deliver(tx: &mpsc::Sender<ServerMessage>, reply: Reply) {
    for message in reply.into_messages() {
        if tx.send(message).await.is_err() {
            break;
        }
    }
}
