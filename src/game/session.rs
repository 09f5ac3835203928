use axum::extract::ws::Message;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::Rejection;
use crate::game::broadcaster;
use crate::game::player::{BloodStain, Role};
use crate::game::registry::Registry;
use crate::websocket::message::{ServerMessage, Winner};

/// Round length in seconds, counted from the first kill.
pub const ROUND_DURATION_SECS: u64 = 300;

/// What one timer tick did. The timer task keeps looping only on
/// `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Counted down and broadcast the remaining time.
    Running,
    /// Reached zero and fired the timeout game over.
    Expired,
    /// The timer was already stopped; nothing was broadcast.
    Stopped,
}

/// The session state machine: the only writer of game state. Processes
/// join, move, kill and accusation requests, adjudicates the round, and
/// fans out the resulting events through the registry.
///
/// Invariants: at most one player ever holds the killer role, assigned at
/// the first-kill latch and never reassigned; the timer runs iff the game
/// has started and no game over has been broadcast; exactly one `gameOver`
/// goes out per session.
pub struct GameSession {
    registry: Registry,
    killer_id: Option<String>,
    first_kill_happened: bool,
    blood_stains: Vec<BloodStain>,
    game_started: bool,
    time_remaining: u64,
    timer_running: bool,
    game_over: bool,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            killer_id: None,
            first_kill_happened: false,
            blood_stains: Vec::new(),
            game_started: false,
            time_remaining: 0,
            timer_running: false,
            game_over: false,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn killer_id(&self) -> Option<&str> {
        self.killer_id.as_deref()
    }

    pub fn game_started(&self) -> bool {
        self.game_started
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn time_remaining(&self) -> u64 {
        self.time_remaining
    }

    /// Kill count for the session; the blood-stain list is the counter.
    pub fn kill_count(&self) -> usize {
        self.blood_stains.len()
    }

    fn game_state(&self) -> ServerMessage {
        ServerMessage::GameState {
            players: self.registry.snapshot(),
            blood_stains: self.blood_stains.clone(),
            game_started: self.game_started,
        }
    }

    /// Register a player and push the full snapshot: once to the joiner,
    /// then to everyone. A duplicate id is a reconnect and replaces the
    /// old connection instead of forking a second entry. Joins are never
    /// rejected; there is no capacity limit and no duplicate-name check.
    pub fn join(
        &mut self,
        id: &str,
        name: String,
        avatar: String,
        x: f64,
        y: f64,
        sender: UnboundedSender<Message>,
    ) {
        self.registry.join(id, name, avatar, x, y, sender);

        // A late joiner after the first kill is an innocent from the start.
        if self.first_kill_happened {
            if let Some(player) = self.registry.get_mut(id) {
                if player.role == Role::Unassigned {
                    player.role = Role::Innocent;
                }
            }
        }

        let state = self.game_state();
        broadcaster::send_to(&self.registry, id, &state);
        broadcaster::broadcast_all(&self.registry, &state);
    }

    /// Remove a player on disconnect and push a fresh snapshot to the
    /// survivors. Returns false (and broadcasts nothing) when the id was
    /// not part of the session. Disconnects never end the round; the only
    /// game-over triggers are kills, accusations and the timer.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.registry.remove(id).is_none() {
            return false;
        }
        let state = self.game_state();
        broadcaster::broadcast_all(&self.registry, &state);
        true
    }

    /// Remove a player only when `sender` is still the connection
    /// registered for that id. A socket whose close arrives after its
    /// player reconnected no longer owns the entry, and its cleanup must
    /// not evict the live connection.
    pub fn remove_connection(&mut self, id: &str, sender: &UnboundedSender<Message>) -> bool {
        let owns = self
            .registry
            .get(id)
            .map(|p| p.sender.same_channel(sender))
            .unwrap_or(false);
        if !owns {
            return false;
        }
        self.remove(id)
    }

    /// Update a player's position and echo it to everyone else. The mover
    /// is skipped: its client already applied the move locally.
    /// Coordinates are client-reported and not validated.
    pub fn move_player(&mut self, id: &str, x: f64, y: f64) -> Result<(), Rejection> {
        let player = self
            .registry
            .get_mut(id)
            .ok_or_else(|| Rejection::UnknownPlayer(id.to_string()))?;
        if !player.alive {
            return Err(Rejection::NotAlive(id.to_string()));
        }
        player.x = x;
        player.y = y;

        broadcaster::broadcast_except(
            &self.registry,
            id,
            &ServerMessage::PlayerMoved {
                id: id.to_string(),
                x,
                y,
            },
        );
        Ok(())
    }

    /// Process a kill request. The actor's role is deliberately not
    /// checked: there is no pre-assigned killer, the round's first
    /// successful kill is what creates the role. Returns true when this
    /// was the first kill, in which case the caller starts the round
    /// timer.
    pub fn kill(
        &mut self,
        killer_id: &str,
        victim_id: &str,
        weapon: Option<String>,
        x: f64,
        y: f64,
    ) -> Result<bool, Rejection> {
        if self.game_over {
            return Err(Rejection::GameOver);
        }
        {
            let actor = self
                .registry
                .get(killer_id)
                .ok_or_else(|| Rejection::UnknownPlayer(killer_id.to_string()))?;
            if !actor.alive {
                return Err(Rejection::NotAlive(killer_id.to_string()));
            }
        }
        {
            let victim = self
                .registry
                .get(victim_id)
                .ok_or_else(|| Rejection::UnknownPlayer(victim_id.to_string()))?;
            if !victim.alive {
                return Err(Rejection::TargetNotAlive(victim_id.to_string()));
            }
        }

        if let Some(victim) = self.registry.get_mut(victim_id) {
            victim.alive = false;
        }
        if let Some(actor) = self.registry.get_mut(killer_id) {
            if weapon.is_some() {
                actor.weapon = weapon;
            }
        }

        let first_kill = !self.first_kill_happened;
        if first_kill {
            // The one-time latch: the actor becomes the killer, everyone
            // else becomes an innocent, and the round clock starts.
            self.first_kill_happened = true;
            self.killer_id = Some(killer_id.to_string());
            self.game_started = true;
            self.time_remaining = ROUND_DURATION_SECS;
            for (id, player) in self.registry.iter_mut() {
                player.role = if id.as_str() == killer_id {
                    Role::Killer
                } else {
                    Role::Innocent
                };
            }
            broadcaster::broadcast_all(
                &self.registry,
                &ServerMessage::FirstKill {
                    killer_id: killer_id.to_string(),
                    victim_id: victim_id.to_string(),
                },
            );
            self.timer_running = true;
        }

        self.blood_stains.push(BloodStain::new(x, y));

        broadcaster::broadcast_all(
            &self.registry,
            &ServerMessage::PlayerKilled {
                killer_id: killer_id.to_string(),
                victim_id: victim_id.to_string(),
                x,
                y,
            },
        );

        self.check_killer_victory();
        Ok(first_kill)
    }

    /// Process an accusation. A correct guess kills the target and ends
    /// the round for the innocents regardless of remaining time; a wrong
    /// guess kills the accuser instead. Returns whether the accusation was
    /// correct.
    pub fn accuse(&mut self, accuser_id: &str, target_id: &str) -> Result<bool, Rejection> {
        if self.game_over {
            return Err(Rejection::GameOver);
        }
        {
            let accuser = self
                .registry
                .get(accuser_id)
                .ok_or_else(|| Rejection::UnknownPlayer(accuser_id.to_string()))?;
            if !accuser.alive {
                return Err(Rejection::NotAlive(accuser_id.to_string()));
            }
        }
        let target_role = {
            let target = self
                .registry
                .get(target_id)
                .ok_or_else(|| Rejection::UnknownPlayer(target_id.to_string()))?;
            if !target.alive {
                return Err(Rejection::TargetNotAlive(target_id.to_string()));
            }
            target.role
        };

        let correct = target_role == Role::Killer;
        let dead_id = if correct { target_id } else { accuser_id };
        if let Some(player) = self.registry.get_mut(dead_id) {
            player.alive = false;
        }

        broadcaster::broadcast_all(
            &self.registry,
            &ServerMessage::PlayerAccused {
                accuser_id: accuser_id.to_string(),
                target_id: target_id.to_string(),
                correct,
            },
        );

        if correct {
            let name = self
                .registry
                .get(target_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            self.finish(
                Winner::Innocents,
                format!("🔍 {} was the killer! The house is safe.", name),
            );
        } else {
            // The accuser's death may have handed the killer the win.
            self.check_killer_victory();
        }
        Ok(correct)
    }

    /// Relay a chat bubble to everyone else. Not stored; the sender's
    /// client already rendered its own bubble.
    pub fn chat(&self, id: &str, message: String, emoji: String) -> Result<(), Rejection> {
        let player = self
            .registry
            .get(id)
            .ok_or_else(|| Rejection::UnknownPlayer(id.to_string()))?;
        if !player.alive {
            return Err(Rejection::NotAlive(id.to_string()));
        }
        broadcaster::broadcast_except(
            &self.registry,
            id,
            &ServerMessage::ChatMessage {
                id: id.to_string(),
                message,
                emoji,
            },
        );
        Ok(())
    }

    /// Relay a furniture interaction ("sleeping on Bed", "watching TV").
    pub fn activity(&self, player_id: &str, activity: String) -> Result<(), Rejection> {
        let player = self
            .registry
            .get(player_id)
            .ok_or_else(|| Rejection::UnknownPlayer(player_id.to_string()))?;
        if !player.alive {
            return Err(Rejection::NotAlive(player_id.to_string()));
        }
        broadcaster::broadcast_except(
            &self.registry,
            player_id,
            &ServerMessage::Activity {
                player_id: player_id.to_string(),
                activity,
            },
        );
        Ok(())
    }

    /// Advance the round clock by one second: broadcast the remaining
    /// time, and at zero fire the timeout outcome in the innocents' favor.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.timer_running {
            return TickOutcome::Stopped;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        broadcaster::broadcast_all(
            &self.registry,
            &ServerMessage::TimerUpdate {
                time: self.time_remaining,
            },
        );
        if self.time_remaining == 0 {
            self.finish(
                Winner::Innocents,
                "⏰ Time ran out! The killer failed.".to_string(),
            );
            return TickOutcome::Expired;
        }
        TickOutcome::Running
    }

    /// The killer wins when no alive innocent remains. Runs after every
    /// death that is not a correct accusation; does nothing before the
    /// killer exists.
    fn check_killer_victory(&mut self) {
        let Some(killer_id) = self.killer_id.clone() else {
            return;
        };
        let survivors = self
            .registry
            .all_alive()
            .filter(|(id, _)| id.as_str() != killer_id)
            .count();
        if survivors > 0 {
            return;
        }
        let name = self
            .registry
            .get(&killer_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.finish(
            Winner::Killer,
            format!("💀 {} eliminated everyone in the house!", name),
        );
    }

    /// Terminal broadcast: at most one per session, and every path through
    /// here stops the timer so no tick outlives the round.
    fn finish(&mut self, winner: Winner, message: String) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.timer_running = false;

        let killer_name = self
            .killer_id
            .as_ref()
            .and_then(|id| self.registry.get(id))
            .map(|p| p.name.clone());
        broadcaster::broadcast_all(
            &self.registry,
            &ServerMessage::GameOver {
                winner,
                message,
                killer_name,
                kills: self.blood_stains.len(),
            },
        );
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
