//! API layer - HTTP and WebSocket entry points.

pub mod connections;
pub mod http;
pub mod websocket;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

pub use connections::{ConnectionInfo, ConnectionManager};
use websocket::WsState;

use crate::app::App;

/// HTTP routes plus `/ws`, each with its own state.
pub fn router(app: Arc<App>, connections: Arc<ConnectionManager>) -> Router {
    let ws_state = Arc::new(WsState {
        app: app.clone(),
        connections,
    });
    http::routes()
        .with_state(app)
        .route("/ws", get(websocket::ws_handler).with_state(ws_state))
}
