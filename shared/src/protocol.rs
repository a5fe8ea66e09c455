use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::ArenaConfig;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "players_state")]
    PlayersState(PlayersStateMsg),
    #[serde(rename = "arena_state")]
    ArenaState(ArenaStateMsg),
    #[serde(rename = "impact")]
    Impact(ImpactMsg),
    #[serde(rename = "knocked_out")]
    KnockedOut(KnockedOutMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub self_id: u32,
    /// The top launched for this player
    pub top_id: u32,
    pub players: Vec<PlayerWire>,
    pub config: ArenaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayersStateMsg {
    pub players: Vec<PlayerWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ArenaStateMsg {
    pub tops: Vec<TopWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopWire {
    pub id: u32,
    pub owner_id: u32,
    pub pos: [f64; 3],
    /// World-space spin axis
    pub axis: [f64; 3],
    pub spin_speed: f64,
    /// spin_speed / max_spin_speed, clamped to [0, 1]
    pub health: f64,
    pub knocked_out: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    pub id: u32,
    pub top_id: u32,
    pub color: u32,
    #[serde(default)]
    pub spin_added: f64,
}

/// One participant's side of a collision. Clients spawn particles and play
/// the hit sound from this.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImpactMsg {
    pub top_id: u32,
    pub other_id: u32,
    pub point: [f64; 3],
    pub impact_speed: f64,
    pub spin_loss: f64,
    pub spin_after: f64,
    pub effect_speed: f64,
    pub effect_lifetime: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct KnockedOutMsg {
    pub top_id: u32,
    pub owner_id: u32,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Power-up: replenish the player's own top
    #[serde(rename = "add_spin")]
    AddSpin { amount: f64 },
}

// === Conversion helpers ===

/// Round to 3 decimal places for the wire
#[inline]
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[inline]
pub fn round3_array(v: glam::DVec3) -> [f64; 3] {
    [round3(v.x), round3(v.y), round3(v.z)]
}
