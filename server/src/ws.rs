use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot, OwnedSemaphorePermit, Semaphore};

use crate::game_loop::{GameBroadcast, GameCommand};
use crate::protocol::{ClientMsg, ServerMsg};

/// Text messages larger than this close the connection
const MAX_MESSAGE_SIZE: usize = 1024;
/// Unparseable messages tolerated before the connection is closed
const MAX_PARSE_ERRORS: u32 = 5;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<GameBroadcast>,
    pub max_add_spin_per_sec: u32,
    pub connection_semaphore: Arc<Semaphore>,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    let permit = match app_state.connection_semaphore.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::warn!("Connection limit reached, rejecting upgrade");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };
    ws.max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, app_state, permit))
        .into_response()
}

/// Fixed one-second window counter
struct RateLimiter {
    limit: u32,
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    fn new(limit: u32) -> Self {
        Self {
            limit,
            window_start: Instant::now(),
            count: 0,
        }
    }

    /// Count one event; false once the window's budget is exceeded.
    fn allow(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.window_start) >= Duration::from_secs(1) {
            self.window_start = now;
            self.count = 0;
        }
        self.count += 1;
        self.count <= self.limit
    }
}

async fn handle_socket(socket: WebSocket, app_state: AppState, _permit: OwnedSemaphorePermit) {
    let (mut sink, mut stream) = socket.split();

    // Join the arena
    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::PlayerJoin { response: resp_tx })
        .await
        .is_err()
    {
        tracing::error!("Failed to send PlayerJoin command");
        return;
    }

    let (my_id, welcome) = match resp_rx.await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Join refused, closing connection");
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
    };

    tracing::info!("Player {} connected", my_id);

    let welcome_json = match serde_json::to_string(&ServerMsg::Welcome(welcome)) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode welcome: {}", e);
            return;
        }
    };
    if sink.send(Message::Text(welcome_json.into())).await.is_ok() {
        // Subscribe to broadcasts
        let mut broadcast_rx = app_state.broadcast_tx.subscribe();
        let mut add_spin_limiter = RateLimiter::new(app_state.max_add_spin_per_sec);
        let mut parse_errors: u32 = 0;

        loop {
            tokio::select! {
                // Client -> Server
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if text.len() > MAX_MESSAGE_SIZE {
                                tracing::warn!("Player {} sent oversized message", my_id);
                                break;
                            }
                            match serde_json::from_str::<ClientMsg>(&text) {
                                Ok(ClientMsg::AddSpin { amount }) => {
                                    if !add_spin_limiter.allow() {
                                        tracing::warn!("Player {} exceeded add_spin rate", my_id);
                                        break;
                                    }
                                    let _ = app_state.game_tx.send(GameCommand::AddSpin {
                                        player_id: my_id,
                                        amount,
                                    }).await;
                                }
                                Err(_) => {
                                    parse_errors += 1;
                                    if parse_errors >= MAX_PARSE_ERRORS {
                                        tracing::warn!("Player {} sent too many bad messages", my_id);
                                        break;
                                    }
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                        _ => {} // Ignore ping/pong/binary
                    }
                }

                // Server -> Client (broadcast)
                result = broadcast_rx.recv() => {
                    match result {
                        Ok(broadcast) => {
                            let msg = match broadcast {
                                GameBroadcast::ArenaState(msg) => ServerMsg::ArenaState(msg),
                                GameBroadcast::PlayersState(msg) => ServerMsg::PlayersState(msg),
                                GameBroadcast::Impact(msg) => ServerMsg::Impact(msg),
                                GameBroadcast::KnockedOut(msg) => ServerMsg::KnockedOut(msg),
                            };

                            if let Ok(json) = serde_json::to_string(&msg) {
                                if sink.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!("Player {} lagged by {} messages", my_id, n);
                            // Snapshots are self-contained, dropping some is fine
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    }

    // Cleanup on disconnect
    let _ = app_state
        .game_tx
        .send(GameCommand::PlayerLeave { id: my_id })
        .await;
    tracing::info!("Player {} disconnected", my_id);
}
