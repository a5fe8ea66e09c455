use crate::arena::ArenaEvent;
use crate::config::ServerConfig;
use crate::protocol::{
    impact_msg, ArenaStateMsg, ImpactMsg, KnockedOutMsg, PlayersStateMsg, WelcomeMsg,
    PROTOCOL_VERSION,
};
use crate::state::GameState;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from client connections to the game loop
pub enum GameCommand {
    PlayerJoin {
        response: oneshot::Sender<(u32, WelcomeMsg)>,
    },
    PlayerLeave {
        id: u32,
    },
    AddSpin {
        player_id: u32,
        amount: f64,
    },
}

/// Broadcasts from game loop to all clients
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    ArenaState(ArenaStateMsg),
    PlayersState(PlayersStateMsg),
    Impact(ImpactMsg),
    KnockedOut(KnockedOutMsg),
}

impl From<&ArenaEvent> for GameBroadcast {
    fn from(event: &ArenaEvent) -> Self {
        match event {
            ArenaEvent::Impact(impact) => GameBroadcast::Impact(impact_msg(impact)),
            ArenaEvent::KnockedOut { top_id, owner_id } => {
                GameBroadcast::KnockedOut(KnockedOutMsg {
                    top_id: *top_id,
                    owner_id: *owner_id,
                })
            }
        }
    }
}

/// Run the fixed-step arena loop. Owns all game state.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
) {
    let mut state = GameState::new(&server_config);

    let dt = server_config.step_seconds();
    let broadcast_every_n = (server_config.tick_rate_hz / server_config.broadcast_rate_hz).max(1);
    let mut tick_count: u64 = 0;

    let mut tick_interval = tokio::time::interval(Duration::from_secs_f64(dt));
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                // Impacts and knockouts go out immediately
                for event in &state.tick(dt) {
                    let _ = broadcast_tx.send(GameBroadcast::from(event));
                }

                // Snapshots at a lower rate
                tick_count += 1;
                if tick_count % broadcast_every_n as u64 == 0 {
                    let msg = state.get_arena_state();
                    let _ = broadcast_tx.send(GameBroadcast::ArenaState(msg));
                }
            }

            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    GameCommand::PlayerJoin { response } => {
                        // A full arena drops `response`, which closes the connection
                        if let Some(player) = state.add_player() {
                            let welcome = WelcomeMsg {
                                protocol_version: PROTOCOL_VERSION,
                                server_version: env!("CARGO_PKG_VERSION").to_string(),
                                self_id: player.id,
                                top_id: player.top_id,
                                players: state.get_players_state().players,
                                config: *state.arena.config(),
                            };
                            let _ = response.send((player.id, welcome));
                            let _ = broadcast_tx.send(GameBroadcast::PlayersState(
                                state.get_players_state(),
                            ));
                            tracing::info!(player = player.id, top = player.top_id, "Player joined");
                        } else {
                            tracing::warn!("Arena full, rejecting player");
                        }
                    }
                    GameCommand::PlayerLeave { id } => {
                        if state.remove_player(id).is_some() {
                            let _ = broadcast_tx.send(GameBroadcast::PlayersState(
                                state.get_players_state(),
                            ));
                            tracing::info!("Player {} left", id);
                        }
                    }
                    GameCommand::AddSpin { player_id, amount } => {
                        if state.add_spin(player_id, amount) {
                            let _ = broadcast_tx.send(GameBroadcast::PlayersState(
                                state.get_players_state(),
                            ));
                        }
                    }
                }
            }

            else => break,
        }
    }

    tracing::info!("Game loop ended");
}
