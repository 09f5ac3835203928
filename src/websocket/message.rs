use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

use crate::game::player::{BloodStain, PlayerView};

/// Messages a client sends to the server. Text JSON envelopes of shape
/// `{"type": "...", ...}`, field names matching the browser client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    PlayerJoin {
        id: String,
        name: String,
        avatar: String,
        x: f64,
        y: f64,
    },
    #[serde(rename_all = "camelCase")]
    PlayerMove { id: String, x: f64, y: f64 },
    #[serde(rename_all = "camelCase")]
    KillPlayer {
        killer_id: String,
        victim_id: String,
        #[serde(default)]
        weapon: Option<String>,
        x: f64,
        y: f64,
    },
    #[serde(rename_all = "camelCase")]
    AccusePlayer {
        accuser_id: String,
        target_id: String,
    },
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        id: String,
        message: String,
        emoji: String,
    },
    #[serde(rename_all = "camelCase")]
    Activity { player_id: String, activity: String },
}

impl ClientMessage {
    /// Parse a text frame. Malformed JSON and unknown types come back as
    /// errors; the caller logs and drops them.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Who won the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Killer,
    Innocents,
}

/// Events the server broadcasts.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    GameState {
        players: Vec<PlayerView>,
        blood_stains: Vec<BloodStain>,
        game_started: bool,
    },
    #[serde(rename_all = "camelCase")]
    PlayerMoved { id: String, x: f64, y: f64 },
    /// The role-creation moment, distinct from the generic kill event.
    #[serde(rename_all = "camelCase")]
    FirstKill {
        killer_id: String,
        victim_id: String,
    },
    #[serde(rename_all = "camelCase")]
    PlayerKilled {
        killer_id: String,
        victim_id: String,
        x: f64,
        y: f64,
    },
    #[serde(rename_all = "camelCase")]
    PlayerAccused {
        accuser_id: String,
        target_id: String,
        correct: bool,
    },
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        id: String,
        message: String,
        emoji: String,
    },
    #[serde(rename_all = "camelCase")]
    Activity { player_id: String, activity: String },
    #[serde(rename_all = "camelCase")]
    TimerUpdate { time: u64 },
    #[serde(rename_all = "camelCase")]
    GameOver {
        winner: Winner,
        message: String,
        killer_name: Option<String>,
        kills: usize,
    },
}

impl ServerMessage {
    pub fn to_ws_message(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::Text(serde_json::to_string(self)?))
    }
}
