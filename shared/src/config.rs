use glam::DVec3;

/// Orbit camera configuration. Angles are in degrees.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    /// Starting distance from the target
    pub distance: f64,
    /// Scroll wheel sensitivity
    pub zoom_speed: f64,
    /// Drag sensitivity (degrees per unit of pointer delta)
    pub rotation_speed: f64,
    /// Keeps the camera above the ground
    pub min_y_angle: f64,
    /// Keeps the camera from flipping over the top
    pub max_y_angle: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub initial_yaw: f64,
    pub initial_pitch: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 10.0,
            zoom_speed: 2.0,
            rotation_speed: 5.0,
            min_y_angle: 10.0,
            max_y_angle: 80.0,
            min_distance: 3.0,
            max_distance: 20.0,
            initial_yaw: 0.0,
            initial_pitch: 30.0,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.min_distance.is_finite() || self.min_distance <= 0.0 {
            return Err("min_distance must be finite and > 0".to_string());
        }
        if !self.max_distance.is_finite() || self.max_distance < self.min_distance {
            return Err("max_distance must be finite and >= min_distance".to_string());
        }
        if !self.min_y_angle.is_finite() || !self.max_y_angle.is_finite() {
            return Err("y angle limits must be finite".to_string());
        }
        if self.max_y_angle < self.min_y_angle {
            return Err("max_y_angle must be >= min_y_angle".to_string());
        }
        if self.min_y_angle <= -90.0 || self.max_y_angle >= 90.0 {
            return Err("y angle limits must stay within (-90, 90)".to_string());
        }
        if !self.zoom_speed.is_finite() || !self.rotation_speed.is_finite() {
            return Err("zoom_speed and rotation_speed must be finite".to_string());
        }
        Ok(())
    }
}

/// Ellipsoidal bowl the tops spin in.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BowlConfig {
    #[ts(type = "[number, number, number]")]
    pub center: DVec3,
    /// Per-axis radii of the ellipsoid
    #[ts(type = "[number, number, number]")]
    pub radii: DVec3,
    /// Downhill acceleration along the bowl surface
    pub slope_accel: f64,
}

impl Default for BowlConfig {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            radii: DVec3::new(2000.0, 2000.0, 1000.0),
            slope_accel: 800.0,
        }
    }
}

impl BowlConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.center.is_finite() {
            return Err("bowl center must be finite".to_string());
        }
        if !self.radii.is_finite() || self.radii.min_element() <= 0.0 {
            return Err("bowl radii must be finite and > 0".to_string());
        }
        if !self.slope_accel.is_finite() || self.slope_accel < 0.0 {
            return Err("slope_accel must be finite and >= 0".to_string());
        }
        Ok(())
    }
}

/// Per-top spin, collision and body settings.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopConfig {
    // Spin
    /// Angular impulse applied at launch; also the starting spin speed
    pub spin_impulse: f64,
    /// Spin axis in the body's local frame
    #[ts(type = "[number, number, number]")]
    pub spin_axis: DVec3,
    pub max_spin_speed: f64,
    /// At or below this the top is knocked out
    pub min_spin_speed: f64,
    /// Spin lost per second
    pub natural_spin_decay: f64,

    // Collision
    pub base_spin_loss_on_hit: f64,
    pub spin_loss_random_range: f64,
    /// Loss multiplier reached when the top holds all of the pair's spin
    pub spin_advantage_multiplier: f64,
    pub knockback_scale: f64,
    /// Particle start speed per unit of impact speed
    pub effect_speed_scale: f64,
    /// Seconds before impact effects are disposed
    pub effect_lifetime: f64,

    // Body
    pub mass: f64,
    pub inertia: f64,
    pub drag: f64,
    pub angular_drag: f64,
    pub knocked_out_angular_drag: f64,
    pub max_angular_velocity: f64,
    pub launch_speed: f64,
    pub jitter_accel: f64,
}

impl Default for TopConfig {
    fn default() -> Self {
        Self {
            spin_impulse: 10000.0,
            spin_axis: DVec3::Z,
            max_spin_speed: 3000.0,
            min_spin_speed: 10.0,
            natural_spin_decay: 0.5,

            base_spin_loss_on_hit: 20.0,
            spin_loss_random_range: 10.0,
            spin_advantage_multiplier: 0.5,
            knockback_scale: 0.5,
            effect_speed_scale: 0.1,
            effect_lifetime: 2.0,

            mass: 60.0,
            inertia: 7.5, // solid disc, r = 0.5
            drag: 0.5,
            angular_drag: 0.02,
            knocked_out_angular_drag: 2.0,
            max_angular_velocity: 3000.0,
            launch_speed: 60.0,
            jitter_accel: 5.0,
        }
    }
}

impl TopConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.spin_axis.is_finite() || self.spin_axis.length_squared() < 1e-12 {
            return Err("spin_axis must be finite and non-zero".to_string());
        }
        if !self.max_spin_speed.is_finite() || self.max_spin_speed <= 0.0 {
            return Err("max_spin_speed must be finite and > 0".to_string());
        }
        if !self.min_spin_speed.is_finite() || self.min_spin_speed < 0.0 {
            return Err("min_spin_speed must be finite and >= 0".to_string());
        }
        if self.min_spin_speed >= self.max_spin_speed {
            return Err("min_spin_speed must be < max_spin_speed".to_string());
        }
        if !self.spin_impulse.is_finite() || self.spin_impulse < 0.0 {
            return Err("spin_impulse must be finite and >= 0".to_string());
        }
        if !self.natural_spin_decay.is_finite() || self.natural_spin_decay < 0.0 {
            return Err("natural_spin_decay must be finite and >= 0".to_string());
        }
        if !self.spin_loss_random_range.is_finite() || self.spin_loss_random_range < 0.0 {
            return Err("spin_loss_random_range must be finite and >= 0".to_string());
        }
        if !self.base_spin_loss_on_hit.is_finite() {
            return Err("base_spin_loss_on_hit must be finite".to_string());
        }
        if !(0.0..=1.0).contains(&self.spin_advantage_multiplier) {
            return Err("spin_advantage_multiplier must be in [0, 1]".to_string());
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err("mass must be finite and > 0".to_string());
        }
        if !self.inertia.is_finite() || self.inertia <= 0.0 {
            return Err("inertia must be finite and > 0".to_string());
        }
        if self.drag < 0.0 || self.angular_drag < 0.0 || self.knocked_out_angular_drag < 0.0 {
            return Err("drag coefficients must be >= 0".to_string());
        }
        if !self.max_angular_velocity.is_finite() || self.max_angular_velocity <= 0.0 {
            return Err("max_angular_velocity must be finite and > 0".to_string());
        }
        Ok(())
    }
}

/// Everything a viewer needs to reproduce the arena.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ArenaConfig {
    pub bowl: BowlConfig,
    pub top: TopConfig,
    #[ts(type = "[number, number, number]")]
    pub gravity: DVec3,
    /// Collision radius of a top
    pub contact_radius: f64,
    /// Spawn points are drawn from this fraction of the bowl radii
    pub spawn_fraction: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            bowl: BowlConfig::default(),
            top: TopConfig::default(),
            gravity: DVec3::new(0.0, -9.81, 0.0),
            contact_radius: 10.0,
            spawn_fraction: 0.5,
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.bowl.validate()?;
        self.top.validate()?;
        if !self.gravity.is_finite() {
            return Err("gravity must be finite".to_string());
        }
        if !self.contact_radius.is_finite() || self.contact_radius <= 0.0 {
            return Err("contact_radius must be finite and > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.spawn_fraction) {
            return Err("spawn_fraction must be in [0, 1]".to_string());
        }
        Ok(())
    }
}
