use axum::extract::ws::Message;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

use crate::game::player::{Player, PlayerView};

/// Authoritative map from player id to its connection and public state.
/// Ids are client-supplied opaque strings, unique per connection.
#[derive(Debug, Default)]
pub struct Registry {
    players: HashMap<String, Player>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
        }
    }

    /// Register a player. Joining with an id that is already present is
    /// treated as a reconnect: the transport handle, name and avatar are
    /// replaced while alive/role/position survive. No shadow entry is ever
    /// created.
    pub fn join(
        &mut self,
        id: &str,
        name: String,
        avatar: String,
        x: f64,
        y: f64,
        sender: UnboundedSender<Message>,
    ) {
        match self.players.get_mut(id) {
            Some(existing) => {
                existing.sender = sender;
                existing.name = name;
                existing.avatar = avatar;
            }
            None => {
                self.players
                    .insert(id.to_string(), Player::new(name, avatar, x, y, sender));
            }
        }
    }

    /// Remove a player on disconnect. No-op if the id was never joined.
    pub fn remove(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Player)> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Player)> {
        self.players.iter_mut()
    }

    /// All players with `alive = true`; the basis for every win-condition
    /// tally.
    pub fn all_alive(&self) -> impl Iterator<Item = (&String, &Player)> {
        self.players.iter().filter(|(_, p)| p.alive)
    }

    /// Public views of every player, for composing a `gameState` broadcast.
    pub fn snapshot(&self) -> Vec<PlayerView> {
        self.players
            .iter()
            .map(|(id, p)| PlayerView {
                id: id.clone(),
                name: p.name.clone(),
                avatar: p.avatar.clone(),
                x: p.x,
                y: p.y,
                alive: p.alive,
            })
            .collect()
    }
}
