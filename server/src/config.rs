pub use spintop_shared::config::{ArenaConfig, BowlConfig, TopConfig};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Fixed simulation steps per second
    pub tick_rate_hz: u32,
    /// Arena snapshots per second
    pub broadcast_rate_hz: u32,
    pub rng_seed: u64,
    /// One top per player, so this also caps players
    pub max_tops: usize,
    pub max_connections: usize,
    /// add_spin messages allowed per client per second before disconnect
    pub max_add_spin_per_sec: u32,
    pub arena: ArenaConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9002".to_string(),
            tick_rate_hz: 60,
            broadcast_rate_hz: 15,
            rng_seed: 42,
            max_tops: 16,
            max_connections: 64,
            max_add_spin_per_sec: 10,
            arena: ArenaConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 {
            return Err("tick_rate_hz must be > 0".to_string());
        }
        if self.broadcast_rate_hz == 0 || self.broadcast_rate_hz > self.tick_rate_hz {
            return Err("broadcast_rate_hz must be in 1..=tick_rate_hz".to_string());
        }
        if self.max_tops == 0 {
            return Err("max_tops must be > 0".to_string());
        }
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }
        self.arena.validate()
    }

    pub fn step_seconds(&self) -> f64 {
        1.0 / self.tick_rate_hz as f64
    }
}
