use axum::routing::get;
use axum::Router;
use spintop_server::config::ServerConfig;
use spintop_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use spintop_server::ws::{ws_handler, AppState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::default();

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(256);

    let app_state = AppState {
        game_tx,
        broadcast_tx: broadcast_tx.clone(),
        max_add_spin_per_sec: config.max_add_spin_per_sec,
        connection_semaphore: Arc::new(Semaphore::new(config.max_connections)),
    };

    tracing::info!(
        tick_rate_hz = config.tick_rate_hz,
        max_tops = config.max_tops,
        "Starting arena loop"
    );

    // Spawn game loop
    tokio::spawn(async move {
        run_game_loop(game_rx, broadcast_tx, config).await;
    });

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", listen_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Spin-top arena listening on {}", listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
