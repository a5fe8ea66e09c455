//! Wire types are defined in the shared crate; this module converts arena
//! state into them.

pub use spintop_shared::protocol::*;

use crate::arena::ArenaTop;
use crate::collision::Impact;
use crate::player::Player;

pub fn top_wire(entry: &ArenaTop) -> TopWire {
    let top = &entry.top;
    TopWire {
        id: top.id,
        owner_id: top.owner_id,
        pos: round3_array(entry.body.position),
        axis: round3_array(top.world_spin_axis(&entry.body)),
        spin_speed: round3(top.spin_speed()),
        health: round3(top.spin_health()),
        knocked_out: top.is_knocked_out(),
    }
}

pub fn player_wire(player: &Player) -> PlayerWire {
    PlayerWire {
        id: player.id,
        top_id: player.top_id,
        color: player.color,
        spin_added: player.spin_added,
    }
}

pub fn impact_msg(impact: &Impact) -> ImpactMsg {
    ImpactMsg {
        top_id: impact.top_id,
        other_id: impact.other_id,
        point: round3_array(impact.point),
        impact_speed: round3(impact.impact_speed),
        spin_loss: round3(impact.spin_loss),
        spin_after: round3(impact.spin_after),
        effect_speed: round3(impact.effect_speed),
        effect_lifetime: impact.effect_lifetime,
    }
}
