use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::game::timer;
use crate::websocket::message::ClientMessage;
use crate::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection for its whole lifetime.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // The id this connection registered with on playerJoin
    let mut player_id: Option<String> = None;

    // Spawn task for sending outgoing messages
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_text_message(&state, &tx, &mut player_id, &text).await;
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Ok(_) => {
                // Ignore other message types (binary, ping, pong)
            }
            Err(e) => {
                tracing::warn!("WebSocket error for {:?}: {}", player_id, e);
                break;
            }
        }
    }

    // Cleanup: remove the player if this connection still owns the entry
    // (a reconnect with the same id hands ownership to the new socket)
    if let Some(id) = player_id {
        let mut session = state.session.write().await;
        if session.remove_connection(&id, &tx) {
            tracing::info!(
                "Player {} disconnected. Remaining players: {}",
                id,
                session.registry().len()
            );
        }
    }

    // Abort the send task
    send_task.abort();
}

/// Dispatch a text frame into the session. Rejected requests are dropped
/// with a debug log; the client never gets an error frame.
async fn handle_text_message(
    state: &AppState,
    tx: &mpsc::UnboundedSender<Message>,
    player_id: &mut Option<String>,
    text: &str,
) {
    let msg = match ClientMessage::parse(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Unknown message: {} ({})", text, e);
            return;
        }
    };

    match msg {
        ClientMessage::PlayerJoin {
            id,
            name,
            avatar,
            x,
            y,
        } => {
            let mut session = state.session.write().await;
            session.join(&id, name, avatar, x, y, tx.clone());
            tracing::info!(
                "Player {} joined. Total players: {}",
                id,
                session.registry().len()
            );
            *player_id = Some(id);
        }
        ClientMessage::PlayerMove { id, x, y } => {
            let mut session = state.session.write().await;
            if let Err(reason) = session.move_player(&id, x, y) {
                tracing::debug!("Dropped move: {}", reason);
            }
        }
        ClientMessage::KillPlayer {
            killer_id,
            victim_id,
            weapon,
            x,
            y,
        } => {
            let first_kill = {
                let mut session = state.session.write().await;
                match session.kill(&killer_id, &victim_id, weapon, x, y) {
                    Ok(first) => first,
                    Err(reason) => {
                        tracing::debug!("Dropped kill: {}", reason);
                        false
                    }
                }
            };
            if first_kill {
                tracing::info!("First kill! {} is now the killer", killer_id);
                tokio::spawn(timer::run_round_timer(state.session.clone()));
            }
        }
        ClientMessage::AccusePlayer {
            accuser_id,
            target_id,
        } => {
            let mut session = state.session.write().await;
            match session.accuse(&accuser_id, &target_id) {
                Ok(correct) => {
                    tracing::info!(
                        "{} accused {} ({})",
                        accuser_id,
                        target_id,
                        if correct { "correct" } else { "wrong" }
                    );
                }
                Err(reason) => tracing::debug!("Dropped accusation: {}", reason),
            }
        }
        ClientMessage::ChatMessage { id, message, emoji } => {
            let session = state.session.read().await;
            if let Err(reason) = session.chat(&id, message, emoji) {
                tracing::debug!("Dropped chat: {}", reason);
            }
        }
        ClientMessage::Activity {
            player_id,
            activity,
        } => {
            let session = state.session.read().await;
            if let Err(reason) = session.activity(&player_id, activity) {
                tracing::debug!("Dropped activity: {}", reason);
            }
        }
    }
}
