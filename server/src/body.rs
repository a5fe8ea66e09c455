//! Physics host seam.
//!
//! The spin simulator only talks to a body through [`RigidBody`]. [`Body`] is
//! the minimal host the arena runs on: a point mass with scalar inertia,
//! linear/angular damping and an angular speed clamp.

use glam::{DQuat, DVec3};
use spintop_shared::config::TopConfig;

/// How a force or torque is applied, matching the usual engine conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous, scaled by mass (or inertia) and step duration
    Force,
    /// Continuous, scaled by step duration only
    Acceleration,
    /// Instant, scaled by mass (or inertia)
    Impulse,
    /// Instant, applied as-is
    VelocityChange,
}

pub trait RigidBody {
    fn position(&self) -> DVec3;
    fn velocity(&self) -> DVec3;
    fn angular_velocity(&self) -> DVec3;
    /// Local direction to world space
    fn transform_direction(&self, local: DVec3) -> DVec3;
    /// Forces accumulate until the host integrates the step; getters keep
    /// returning start-of-step values.
    fn add_force(&mut self, force: DVec3, mode: ForceMode);
    fn add_torque(&mut self, torque: DVec3, mode: ForceMode);
    fn set_angular_damping(&mut self, damping: f64);
}

/// Pending velocity changes, split into continuous (per second) and instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Accumulator {
    rate: DVec3,
    instant: DVec3,
}

impl Accumulator {
    fn add(&mut self, v: DVec3, mode: ForceMode, mass: f64) {
        match mode {
            ForceMode::Force => self.rate += v / mass,
            ForceMode::Acceleration => self.rate += v,
            ForceMode::Impulse => self.instant += v / mass,
            ForceMode::VelocityChange => self.instant += v,
        }
    }

    fn take(&mut self, dt: f64) -> DVec3 {
        let dv = self.rate * dt + self.instant;
        *self = Self::default();
        dv
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub position: DVec3,
    pub velocity: DVec3,
    pub rotation: DQuat,
    pub angular_velocity: DVec3,
    pub mass: f64,
    pub inertia: f64,
    pub drag: f64,
    pub angular_drag: f64,
    pub max_angular_velocity: f64,
    linear: Accumulator,
    angular: Accumulator,
}

impl Body {
    pub fn new(position: DVec3, config: &TopConfig) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            angular_velocity: DVec3::ZERO,
            mass: config.mass,
            inertia: config.inertia,
            drag: config.drag,
            angular_drag: config.angular_drag,
            max_angular_velocity: config.max_angular_velocity,
            linear: Accumulator::default(),
            angular: Accumulator::default(),
        }
    }

    /// Apply accumulated forces plus `gravity`, then advance one step.
    pub fn integrate(&mut self, dt: f64, gravity: DVec3) {
        self.velocity += self.linear.take(dt) + gravity * dt;
        self.velocity *= 1.0 / (1.0 + self.drag * dt);
        self.position += self.velocity * dt;

        self.angular_velocity += self.angular.take(dt);
        self.angular_velocity *= 1.0 / (1.0 + self.angular_drag * dt);
        self.angular_velocity = self
            .angular_velocity
            .clamp_length_max(self.max_angular_velocity);

        self.rotation =
            (DQuat::from_scaled_axis(self.angular_velocity * dt) * self.rotation).normalize();
    }
}

impl RigidBody for Body {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn velocity(&self) -> DVec3 {
        self.velocity
    }

    fn angular_velocity(&self) -> DVec3 {
        self.angular_velocity
    }

    fn transform_direction(&self, local: DVec3) -> DVec3 {
        self.rotation * local
    }

    fn add_force(&mut self, force: DVec3, mode: ForceMode) {
        self.linear.add(force, mode, self.mass);
    }

    fn add_torque(&mut self, torque: DVec3, mode: ForceMode) {
        self.angular.add(torque, mode, self.inertia);
    }

    fn set_angular_damping(&mut self, damping: f64) {
        self.angular_drag = damping;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn still_body() -> Body {
        let config = TopConfig {
            drag: 0.0,
            angular_drag: 0.0,
            ..Default::default()
        };
        Body::new(DVec3::ZERO, &config)
    }

    fn assert_vec3_close(actual: DVec3, expected: DVec3) {
        assert!(
            (actual - expected).length() < 1e-9,
            "Expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn getters_ignore_pending_forces() {
        let mut body = still_body();
        body.add_force(DVec3::X, ForceMode::VelocityChange);
        body.add_torque(DVec3::Y, ForceMode::VelocityChange);
        assert_eq!(body.velocity(), DVec3::ZERO);
        assert_eq!(body.angular_velocity(), DVec3::ZERO);
    }

    #[test]
    fn force_modes_scale_as_expected() {
        let mut body = still_body();
        body.add_force(DVec3::X * 60.0, ForceMode::Force);
        body.integrate(DT, DVec3::ZERO);
        assert_vec3_close(body.velocity, DVec3::X * DT);

        let mut body = still_body();
        body.add_force(DVec3::X * 2.0, ForceMode::Acceleration);
        body.integrate(DT, DVec3::ZERO);
        assert_vec3_close(body.velocity, DVec3::X * 2.0 * DT);

        let mut body = still_body();
        body.add_force(DVec3::X * 120.0, ForceMode::Impulse);
        body.integrate(DT, DVec3::ZERO);
        assert_vec3_close(body.velocity, DVec3::X * 2.0);

        let mut body = still_body();
        body.add_force(DVec3::X * 3.0, ForceMode::VelocityChange);
        body.integrate(DT, DVec3::ZERO);
        assert_vec3_close(body.velocity, DVec3::X * 3.0);
    }

    #[test]
    fn torque_impulse_divides_by_inertia() {
        let mut body = still_body();
        body.add_torque(DVec3::Z * 75.0, ForceMode::Impulse);
        body.integrate(DT, DVec3::ZERO);
        assert_vec3_close(body.angular_velocity, DVec3::Z * 10.0);
    }

    #[test]
    fn accumulators_reset_after_integrate() {
        let mut body = still_body();
        body.add_force(DVec3::X, ForceMode::VelocityChange);
        body.integrate(DT, DVec3::ZERO);
        body.integrate(DT, DVec3::ZERO);
        assert_vec3_close(body.velocity, DVec3::X);
    }

    #[test]
    fn gravity_accelerates_body() {
        let mut body = still_body();
        let gravity = DVec3::new(0.0, -9.81, 0.0);
        for _ in 0..60 {
            body.integrate(DT, gravity);
        }
        assert!((body.velocity.y + 9.81).abs() < 1e-9);
        assert!(body.position.y < 0.0);
    }

    #[test]
    fn drag_slows_body() {
        let mut body = Body::new(DVec3::ZERO, &TopConfig::default());
        body.velocity = DVec3::X * 10.0;
        body.integrate(DT, DVec3::ZERO);
        assert!(body.velocity.x < 10.0);
        assert!(body.velocity.x > 9.0);
    }

    #[test]
    fn angular_speed_clamped() {
        let mut body = still_body();
        body.add_torque(DVec3::Z * 1e9, ForceMode::VelocityChange);
        body.integrate(DT, DVec3::ZERO);
        assert!((body.angular_velocity.length() - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn rotation_follows_angular_velocity() {
        let mut body = still_body();
        body.angular_velocity = DVec3::Y * std::f64::consts::FRAC_PI_2;
        body.integrate(1.0, DVec3::ZERO);
        // Quarter turn about +Y takes +Z to +X
        assert_vec3_close(body.transform_direction(DVec3::Z), DVec3::X);
    }

    #[test]
    fn set_angular_damping_updates_drag() {
        let mut body = still_body();
        body.set_angular_damping(2.0);
        assert_eq!(body.angular_drag, 2.0);
    }
}
