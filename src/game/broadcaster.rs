use crate::game::registry::Registry;
use crate::websocket::message::ServerMessage;

/// Send an event to every open connection. Delivery is best-effort: a
/// closed channel is skipped, the next broadcast self-heals the miss.
pub fn broadcast_all(registry: &Registry, event: &ServerMessage) {
    let Some(msg) = encode(event) else { return };
    for (_, player) in registry.iter() {
        let _ = player.send(msg.clone());
    }
}

/// Send an event to everyone except one id. Used for movement and relay
/// echo suppression: the origin already applied the change locally.
pub fn broadcast_except(registry: &Registry, excluded_id: &str, event: &ServerMessage) {
    let Some(msg) = encode(event) else { return };
    for (id, player) in registry.iter() {
        if id.as_str() != excluded_id {
            let _ = player.send(msg.clone());
        }
    }
}

/// Unicast, used for the initial snapshot delivered to a new joiner.
pub fn send_to(registry: &Registry, id: &str, event: &ServerMessage) {
    let Some(msg) = encode(event) else { return };
    if let Some(player) = registry.get(id) {
        let _ = player.send(msg);
    }
}

fn encode(event: &ServerMessage) -> Option<axum::extract::ws::Message> {
    match event.to_ws_message() {
        Ok(msg) => Some(msg),
        Err(e) => {
            tracing::error!("Failed to serialize event: {}", e);
            None
        }
    }
}
