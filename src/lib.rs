//! Server for the Mystery House party game: tracks connected players over
//! WebSocket, assigns the killer role on the round's first kill, relays
//! movement/chat/kill/accusation events and adjudicates the round.
//!
//! The binary expects the browser client's static files in a `public/`
//! directory next to the working directory it is launched from; without
//! them only the `/ws` endpoint is served.

pub mod error;
pub mod game;
pub mod websocket;

use std::sync::Arc;
use tokio::sync::RwLock;

use game::session::GameSession;

/// Application state shared across all connections
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<GameSession>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: Arc::new(RwLock::new(GameSession::new())),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
