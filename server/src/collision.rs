//! Top-vs-top collision resolution.
//!
//! Each top loses spin on its own terms: its share of the pair's combined
//! spin decides how much of the base loss it takes. The two losses are not
//! balanced against each other.

use glam::DVec3;
use rand::Rng;
use spintop_shared::config::TopConfig;

use crate::body::{ForceMode, RigidBody};
use crate::top::SpinTop;

/// Host-reported contact between two tops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// First contact point
    pub point: DVec3,
    /// Velocity of the first body relative to the second
    pub relative_velocity: DVec3,
}

/// One participant's result of a resolved collision.
#[derive(Debug, Clone, PartialEq)]
pub struct Impact {
    pub top_id: u32,
    pub other_id: u32,
    pub point: DVec3,
    pub impact_speed: f64,
    pub spin_loss: f64,
    pub spin_after: f64,
    /// Suggested particle start speed
    pub effect_speed: f64,
    pub effect_lifetime: f64,
}

/// Share of the pair's spin held by `own`. Even split when both are zero.
pub fn spin_ratio(own: f64, other: f64) -> f64 {
    let total = own + other;
    if total <= 0.0 {
        return 0.5;
    }
    own / total
}

/// Loss multiplier: 1 with no share of the spin, `multiplier` with all of it.
pub fn spin_advantage(ratio: f64, multiplier: f64) -> f64 {
    let t = ratio.clamp(0.0, 1.0);
    1.0 + (multiplier - 1.0) * t
}

pub fn spin_loss(config: &TopConfig, ratio: f64, rng: &mut impl Rng) -> f64 {
    let range = config.spin_loss_random_range;
    let random_factor = if range > 0.0 {
        rng.gen_range(-range..=range)
    } else {
        0.0
    };
    (config.base_spin_loss_on_hit + random_factor)
        * spin_advantage(ratio, config.spin_advantage_multiplier)
}

/// Resolve a contact between two tops. Both lose spin based on their own
/// pre-collision share and get knocked apart. Returns `None` without touching
/// anything if either top is already knocked out.
pub fn resolve<B: RigidBody>(
    top_a: &mut SpinTop,
    body_a: &mut B,
    top_b: &mut SpinTop,
    body_b: &mut B,
    contact: &Contact,
    rng: &mut impl Rng,
) -> Option<[Impact; 2]> {
    if top_a.is_knocked_out() || top_b.is_knocked_out() {
        return None;
    }

    let spin_a = top_a.spin_speed();
    let spin_b = top_b.spin_speed();
    let loss_a = spin_loss(top_a.config(), spin_ratio(spin_a, spin_b), rng);
    let loss_b = spin_loss(top_b.config(), spin_ratio(spin_b, spin_a), rng);

    let impact_speed = contact.relative_velocity.length();
    let away_from_b = (body_a.position() - body_b.position()).normalize_or_zero();

    let impact_a = hit(top_a, body_a, top_b.id, away_from_b, loss_a, impact_speed, contact);
    let impact_b = hit(top_b, body_b, top_a.id, -away_from_b, loss_b, impact_speed, contact);

    Some([impact_a, impact_b])
}

fn hit(
    top: &mut SpinTop,
    body: &mut impl RigidBody,
    other_id: u32,
    away: DVec3,
    loss: f64,
    impact_speed: f64,
    contact: &Contact,
) -> Impact {
    let spin_after = top.lose_spin(loss);
    let config = *top.config();
    body.add_force(
        away * impact_speed * config.knockback_scale,
        ForceMode::Impulse,
    );

    tracing::debug!(
        top = top.id,
        other = other_id,
        loss = format_args!("{:.1}", loss),
        spin = format_args!("{:.1}", spin_after),
        "top lost spin"
    );

    Impact {
        top_id: top.id,
        other_id,
        point: contact.point,
        impact_speed,
        spin_loss: loss,
        spin_after,
        effect_speed: impact_speed * config.effect_speed_scale,
        effect_lifetime: config.effect_lifetime,
    }
}
