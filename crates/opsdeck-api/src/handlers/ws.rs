//! WebSocket upgrade handler for the notification channel.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// The session token.
    pub token: String,
}

/// GET /ws/notifications?token={jwt} — WebSocket upgrade.
///
/// The handshake token is signature-checked only; full revocation and
/// inactivity checks stay on the REST path, where every request consults
/// the event log.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let claims = state.token_decoder.decode(&query.token)?;
    let user_id = claims.user_id();

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, user_id, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, user_id: i64, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.push_hub.register(user_id);
    let conn_id = handle.id;

    // Initial payload: the current unread count.
    state.push_hub.send_count_to(&handle).await;

    // Outbound forwarder: drains the hub's queue into the socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound loop: the channel is push-only, so we only watch for close.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.push_hub.unregister(&conn_id);

    info!(conn_id = %conn_id, user_id, "WebSocket connection closed");
}
