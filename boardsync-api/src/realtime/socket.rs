/// The `/ws` WebSocket endpoint
///
/// Connection state machine: unauthenticated → authenticated →
/// subscribed(board)* → disconnected. The credential is checked at the
/// handshake, before the protocol upgrade - a missing or invalid token
/// terminates the connection immediately, so no anonymous connection is
/// ever admitted to a room.
///
/// After the upgrade the client drives its subscriptions with
/// `join_board`/`leave_board` commands. Join is trusted to the
/// authenticated identity and does not re-check board access; access is
/// re-validated on every mutation, which is what actually gates visibility
/// of sensitive state - the event stream only ever says "refetch".
///
/// # Endpoint
///
/// ```text
/// GET /ws?token=<access-jwt>
/// ```

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::realtime::events::ClientCommand;
use boardsync_shared::auth::jwt;

/// Handshake query parameters
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Access token presented at connection time
    pub token: Option<String>,
}

/// WebSocket upgrade handler
///
/// Validates the access token before upgrading; failures surface as plain
/// HTTP errors and the connection never reaches a room.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    let claims = jwt::validate_access_token(&token, state.jwt_secret())?;
    let user_id = claims.sub;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Drives one authenticated connection until it closes
async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let connection_id = Uuid::new_v4();
    tracing::info!(%connection_id, %user_id, "realtime connection established");

    let (mut sink, mut stream) = socket.split();
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    // Forward broadcast frames to the socket. Ends when every sender clone
    // registered in the rooms map has been dropped.
    let writer = tokio::spawn(async move {
        while let Some(frame) = receiver.recv().await {
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<ClientCommand>(&text) {
                Ok(ClientCommand::JoinBoard { board_id }) => {
                    state
                        .rooms
                        .join(board_id, connection_id, sender.clone())
                        .await;
                }
                Ok(ClientCommand::LeaveBoard { board_id }) => {
                    state.rooms.leave(board_id, connection_id).await;
                }
                Err(error) => {
                    tracing::debug!(%connection_id, %error, "ignoring malformed realtime command");
                }
            },
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames carry nothing here.
            _ => {}
        }
    }

    state.rooms.disconnect(connection_id).await;
    drop(sender);
    let _ = writer.await;

    tracing::info!(%connection_id, %user_id, "realtime connection closed");
}
