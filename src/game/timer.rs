use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};

use crate::game::session::{GameSession, TickOutcome};

/// Tick interval for the round countdown.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Drive the round countdown. Spawned exactly once per session, at the
/// first kill; exits as soon as the session reports the timer stopped, so
/// a game over reached on any path also ends this task on its next wakeup
/// without a further broadcast.
pub async fn run_round_timer(session: Arc<RwLock<GameSession>>) {
    let mut timer = interval(TICK_INTERVAL);
    // An interval's first tick completes immediately; skip it so the first
    // countdown broadcast lands one full second after the kill.
    timer.tick().await;

    loop {
        timer.tick().await;

        let mut session = session.write().await;
        match session.tick() {
            TickOutcome::Running => {}
            TickOutcome::Expired => {
                tracing::info!("Round timer expired");
                break;
            }
            TickOutcome::Stopped => {
                tracing::info!("Round timer stopped - game is over");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ws::Message;
    use serde_json::Value;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn join(session: &mut GameSession, id: &str) -> UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        session.join(id, id.to_string(), "🙂".to_string(), 0.0, 0.0, tx);
        rx
    }

    fn drain(rx: &mut UnboundedReceiver<Message>) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(Message::Text(text)) = rx.try_recv() {
            out.push(serde_json::from_str(&text).unwrap());
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn timer_task_counts_down_once_per_second() {
        let session = Arc::new(RwLock::new(GameSession::new()));
        let mut rx1 = {
            let mut s = session.write().await;
            let rx1 = join(&mut s, "p1");
            let _rx2 = join(&mut s, "p2");
            let _rx3 = join(&mut s, "p3");
            s.kill("p2", "p3", None, 0.0, 0.0).unwrap();
            rx1
        };
        drain(&mut rx1);

        let handle = tokio::spawn(run_round_timer(session.clone()));
        tokio::time::sleep(Duration::from_millis(3500)).await;

        let ticks: Vec<u64> = drain(&mut rx1)
            .into_iter()
            .filter(|v| v["type"] == "timerUpdate")
            .map(|v| v["time"].as_u64().unwrap())
            .collect();
        assert_eq!(ticks, vec![299, 298, 297]);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn timer_task_exits_after_game_over_without_extra_ticks() {
        let session = Arc::new(RwLock::new(GameSession::new()));
        let mut rx1 = {
            let mut s = session.write().await;
            let rx1 = join(&mut s, "p1");
            let _rx2 = join(&mut s, "p2");
            let _rx3 = join(&mut s, "p3");
            s.kill("p2", "p3", None, 0.0, 0.0).unwrap();
            rx1
        };

        let handle = tokio::spawn(run_round_timer(session.clone()));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // End the round between ticks
        session.write().await.accuse("p1", "p2").unwrap();
        drain(&mut rx1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        // Nothing ticked after the game over, and the task is gone
        assert!(drain(&mut rx1).is_empty());
        assert!(handle.is_finished());
    }
}
