//! Spinning-top simulator.
//!
//! A top carries a scalar spin speed that stands in for its stored rotational
//! energy. Every fixed step the spin decays, and the body's real angular
//! velocity is nudged toward it. The spin axis is righted toward the bowl
//! normal and the top is pushed downhill. Once the spin drops to the
//! knockout threshold the top goes inert for good.

use glam::DVec3;
use rand::Rng;
use spintop_shared::config::TopConfig;

use crate::body::{ForceMode, RigidBody};
use crate::bowl::Bowl;

/// Maintenance kicks in below this fraction of the target spin
const SPIN_TOLERANCE: f64 = 0.9;
/// Proportional gain of the spin maintenance correction
const SPIN_CORRECTION_GAIN: f64 = 0.1;
/// Precession torque per (spin * degree of tilt)
const PRECESSION_GAIN: f64 = 0.01;
/// Minimum axial spin for precession to apply
const PRECESSION_MIN_SPIN: f64 = 1.0;
/// Below this squared speed a spinning top counts as stalled
const STALL_SPEED_SQ: f64 = 0.01;
/// Minimum axial spin for anti-stall jitter
const STALL_MIN_SPIN: f64 = 10.0;

/// Per-step inputs owned by the host.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub dt: f64,
    pub gravity: DVec3,
    pub bowl: &'a Bowl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Already knocked out, nothing applied
    Inert,
    Spinning,
    /// Knocked out during this step
    KnockedOut,
}

#[derive(Debug, Clone)]
pub struct SpinTop {
    pub id: u32,
    pub owner_id: u32,
    config: TopConfig,
    spin_speed: f64,
    knocked_out: bool,
}

impl SpinTop {
    pub fn new(id: u32, owner_id: u32, config: TopConfig) -> Self {
        Self {
            id,
            owner_id,
            spin_speed: config.spin_impulse,
            knocked_out: false,
            config,
        }
    }

    pub fn config(&self) -> &TopConfig {
        &self.config
    }

    pub fn spin_speed(&self) -> f64 {
        self.spin_speed
    }

    pub fn is_knocked_out(&self) -> bool {
        self.knocked_out
    }

    /// Spin as a fraction of the maximum, for HUDs.
    pub fn spin_health(&self) -> f64 {
        (self.spin_speed / self.config.max_spin_speed).clamp(0.0, 1.0)
    }

    /// World-space spin axis of the body this top drives.
    pub fn world_spin_axis(&self, body: &impl RigidBody) -> DVec3 {
        body.transform_direction(self.config.spin_axis)
            .normalize_or_zero()
    }

    /// Throw the top into the bowl: random downward-biased velocity plus the
    /// spin impulse about its axis.
    pub fn launch(&mut self, body: &mut impl RigidBody, rng: &mut impl Rng) {
        let mut velocity = inside_unit_sphere(rng) * self.config.launch_speed;
        if velocity.y > 0.0 {
            velocity.y = -velocity.y;
        }
        body.add_force(velocity, ForceMode::VelocityChange);

        let axis = self.world_spin_axis(body);
        body.add_torque(axis * self.config.spin_impulse, ForceMode::Impulse);

        self.spin_speed = self.config.spin_impulse;
    }

    /// One fixed simulation step.
    pub fn fixed_update(
        &mut self,
        body: &mut impl RigidBody,
        ctx: &StepContext<'_>,
        rng: &mut impl Rng,
    ) -> StepOutcome {
        if self.knocked_out {
            return StepOutcome::Inert;
        }

        self.spin_speed = (self.spin_speed - self.config.natural_spin_decay * ctx.dt).max(0.0);
        if self.spin_speed <= self.config.min_spin_speed {
            self.knock_out(body);
            return StepOutcome::KnockedOut;
        }

        let axis = self.world_spin_axis(body);
        let actual_spin = body.angular_velocity().dot(axis);

        if actual_spin.abs() < self.spin_speed * SPIN_TOLERANCE {
            let correction = axis * (self.spin_speed - actual_spin) * SPIN_CORRECTION_GAIN;
            body.add_torque(correction, ForceMode::VelocityChange);
        }

        let normal = ctx.bowl.normal_at(body.position());

        if actual_spin.abs() > PRECESSION_MIN_SPIN {
            body.add_torque(precession_torque(axis, normal, actual_spin), ForceMode::Force);
        }

        body.add_force(
            ctx.bowl.slope_acceleration(ctx.gravity, normal),
            ForceMode::Acceleration,
        );

        if body.velocity().length_squared() < STALL_SPEED_SQ && actual_spin.abs() > STALL_MIN_SPIN
        {
            body.add_force(
                inside_unit_sphere(rng) * self.config.jitter_accel,
                ForceMode::Acceleration,
            );
        }

        StepOutcome::Spinning
    }

    /// Replenish spin, capped at the maximum. Does not revive a knocked-out
    /// top; non-positive or non-finite amounts are ignored.
    pub fn add_spin(&mut self, amount: f64) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        self.spin_speed = (self.spin_speed + amount).min(self.config.max_spin_speed);
    }

    /// Remove `loss` spin (negative loss adds), floored at zero.
    pub(crate) fn lose_spin(&mut self, loss: f64) -> f64 {
        self.spin_speed = (self.spin_speed - loss).max(0.0);
        self.spin_speed
    }

    fn knock_out(&mut self, body: &mut impl RigidBody) {
        self.knocked_out = true;
        body.set_angular_damping(self.config.knocked_out_angular_drag);
        tracing::info!(top = self.id, owner = self.owner_id, "top knocked out");
    }
}

/// Torque turning `axis` toward `normal`, growing with spin and tilt.
pub fn precession_torque(axis: DVec3, normal: DVec3, spin: f64) -> DVec3 {
    let tilt_axis = axis.cross(normal).normalize_or_zero();
    tilt_axis * spin * angle_degrees(axis, normal) * PRECESSION_GAIN
}

/// Angle between two vectors in degrees; zero if either is degenerate.
pub fn angle_degrees(a: DVec3, b: DVec3) -> f64 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < 1e-15 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Uniform point inside the unit sphere.
pub fn inside_unit_sphere(rng: &mut impl Rng) -> DVec3 {
    loop {
        let p = DVec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}
