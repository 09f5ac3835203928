use axum::extract::ws::Message;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Role a player holds within the round.
///
/// Everyone starts unassigned; the round's first successful kill makes its
/// actor the killer and everyone else innocent. The killer role is assigned
/// once and never moves to another player, even after the killer dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Unassigned,
    Innocent,
    Killer,
}

#[derive(Debug)]
pub struct Player {
    pub name: String,
    pub avatar: String,
    pub x: f64,
    pub y: f64,
    pub alive: bool,
    pub role: Role,
    /// Weapon reported on a kill. Never serialized; it would give the
    /// killer away.
    pub weapon: Option<String>,
    pub sender: UnboundedSender<Message>,
}

impl Player {
    pub fn new(
        name: String,
        avatar: String,
        x: f64,
        y: f64,
        sender: UnboundedSender<Message>,
    ) -> Self {
        Self {
            name,
            avatar,
            x,
            y,
            alive: true,
            role: Role::Unassigned,
            weapon: None,
            sender,
        }
    }

    /// Send a message to this player's connection
    pub fn send(&self, message: Message) -> bool {
        self.sender.send(message).is_ok()
    }
}

/// What every client may know about a player: the `gameState` snapshot
/// entry, with the transport handle, role and weapon stripped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub x: f64,
    pub y: f64,
    pub alive: bool,
}

/// Marker left where a kill happened. The list only grows within a
/// session; its length doubles as the kill counter.
#[derive(Debug, Clone, Serialize)]
pub struct BloodStain {
    pub id: Uuid,
    pub x: f64,
    pub y: f64,
}

impl BloodStain {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn new_player_starts_alive_and_unassigned() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let player = Player::new("Hato".to_string(), "🐔".to_string(), 1000.0, 750.0, tx);

        assert!(player.alive);
        assert_eq!(player.role, Role::Unassigned);
        assert!(player.weapon.is_none());
    }

    #[test]
    fn player_send_reaches_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let player = Player::new("Jbro".to_string(), "🐸".to_string(), 0.0, 0.0, tx);

        assert!(player.send(Message::Text("hello".to_string())));
        if let Ok(Message::Text(text)) = rx.try_recv() {
            assert_eq!(text, "hello");
        } else {
            panic!("Expected text message");
        }
    }

    #[test]
    fn player_send_fails_on_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        let player = Player::new("Gone".to_string(), "👻".to_string(), 0.0, 0.0, tx);
        drop(rx);

        assert!(!player.send(Message::Text("lost".to_string())));
    }

    #[test]
    fn blood_stains_get_unique_ids() {
        let a = BloodStain::new(10.0, 20.0);
        let b = BloodStain::new(10.0, 20.0);
        assert_ne!(a.id, b.id);
    }
}
