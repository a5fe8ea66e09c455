use crate::arena::{Arena, ArenaEvent};
use crate::config::ServerConfig;
use crate::player::Player;
use crate::protocol::{player_wire, top_wire, ArenaStateMsg, PlayersStateMsg};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Central game state owned by the game loop task.
pub struct GameState {
    pub arena: Arena,
    pub players: BTreeMap<u32, Player>,
    pub rng: ChaCha8Rng,
    next_player_id: u32,
    max_tops: usize,
}

impl GameState {
    pub fn new(server_config: &ServerConfig) -> Self {
        Self {
            arena: Arena::new(server_config.arena),
            players: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(server_config.rng_seed),
            next_player_id: 1,
            max_tops: server_config.max_tops,
        }
    }

    /// Add a player and launch their top. None when the arena is full.
    pub fn add_player(&mut self) -> Option<Player> {
        if self.arena.top_count() >= self.max_tops {
            return None;
        }
        let id = self.next_player_id;
        self.next_player_id += 1;

        let top_id = self.arena.add_top(id, &mut self.rng);
        let player = Player::new(id, top_id);
        self.players.insert(id, player.clone());
        Some(player)
    }

    /// Remove a player along with their top
    pub fn remove_player(&mut self, id: u32) -> Option<Player> {
        let player = self.players.remove(&id)?;
        self.arena.remove_top(player.top_id);
        Some(player)
    }

    /// Power-up for a player's own top. Returns false for unknown players or
    /// amounts the top would ignore.
    pub fn add_spin(&mut self, player_id: u32, amount: f64) -> bool {
        if !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        let Some(player) = self.players.get_mut(&player_id) else {
            return false;
        };
        if !self.arena.add_spin(player.top_id, amount) {
            return false;
        }
        player.spin_added += amount;
        true
    }

    /// Step the arena
    pub fn tick(&mut self, dt: f64) -> Vec<ArenaEvent> {
        self.arena.tick(dt, &mut self.rng)
    }

    /// Get arena state for broadcasting
    pub fn get_arena_state(&self) -> ArenaStateMsg {
        ArenaStateMsg {
            tops: self.arena.tops().map(top_wire).collect(),
        }
    }

    /// Get players state for broadcasting
    pub fn get_players_state(&self) -> PlayersStateMsg {
        PlayersStateMsg {
            players: self.players.values().map(player_wire).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> GameState {
        let server_config = ServerConfig {
            max_tops: 3,
            rng_seed: 12345,
            ..Default::default()
        };
        GameState::new(&server_config)
    }

    #[test]
    fn each_player_gets_a_top() {
        let mut state = test_state();
        let p1 = state.add_player().unwrap();
        let p2 = state.add_player().unwrap();
        assert_ne!(p1.id, p2.id);
        assert_ne!(p1.top_id, p2.top_id);
        assert_eq!(state.arena.get_top(p1.top_id).unwrap().top.owner_id, p1.id);
        assert_eq!(state.get_arena_state().tops.len(), 2);
    }

    #[test]
    fn join_rejected_when_arena_full() {
        let mut state = test_state();
        for _ in 0..3 {
            assert!(state.add_player().is_some());
        }
        assert!(state.add_player().is_none());
    }

    #[test]
    fn leaving_removes_top_and_frees_slot() {
        let mut state = test_state();
        let p1 = state.add_player().unwrap();
        state.add_player().unwrap();
        state.add_player().unwrap();

        assert!(state.remove_player(p1.id).is_some());
        assert!(state.arena.get_top(p1.top_id).is_none());
        assert!(state.add_player().is_some());
        assert!(state.remove_player(p1.id).is_none());
    }

    #[test]
    fn add_spin_tracks_total_and_caps_top() {
        let mut state = test_state();
        let player = state.add_player().unwrap();

        assert!(state.add_spin(player.id, 250.0));
        assert!(state.add_spin(player.id, 250.0));
        let players = state.get_players_state().players;
        assert_eq!(players[0].spin_added, 500.0);

        let top = &state.arena.get_top(player.top_id).unwrap().top;
        assert!(top.spin_speed() <= top.config().max_spin_speed);
    }

    #[test]
    fn add_spin_rejects_bad_requests() {
        let mut state = test_state();
        let player = state.add_player().unwrap();
        assert!(!state.add_spin(player.id, -5.0));
        assert!(!state.add_spin(player.id, f64::NAN));
        assert!(!state.add_spin(player.id + 1, 10.0));
        assert_eq!(state.players[&player.id].spin_added, 0.0);
    }

    #[test]
    fn tick_advances_arena() {
        let mut state = test_state();
        let player = state.add_player().unwrap();
        let before = state.arena.get_top(player.top_id).unwrap().top.spin_speed();
        for _ in 0..60 {
            state.tick(1.0 / 60.0);
        }
        let after = state.arena.get_top(player.top_id).unwrap().top.spin_speed();
        assert!(after < before);
    }
}
