use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mystery_house_rs::{websocket, AppState};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mystery_house_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create shared session state
    let state = AppState::new();

    // Build router
    let app = Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handler::ws_handler))
        // Serve the browser client; deploy its static files under
        // ./public next to the binary
        .nest_service("/", ServeDir::new("public"))
        .with_state(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🔪 Mystery House server running on http://localhost:{}", port);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
