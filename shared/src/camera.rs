//! Orbit camera: yaw/pitch/distance around a moving target.
//!
//! `update` consumes the frame's input, `pose` is evaluated after everything
//! else has moved so the camera follows the target's latest position.

use glam::{DMat4, DQuat, DVec2, DVec3, EulerRot};

use crate::config::CameraConfig;

/// Input sampled by the caller once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    /// Pointer movement since the last frame
    pub drag_delta: DVec2,
    /// Scroll wheel movement since the last frame
    pub scroll: f64,
    /// Whether the orbit button is held
    pub drag_held: bool,
}

/// Camera placement produced by [`OrbitCamera::pose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: DVec3,
    pub rotation: DQuat,
    pub target: DVec3,
}

impl CameraPose {
    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// Left-handed view matrix (+Z forward, +Y up).
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_lh(self.position, self.target, DVec3::Y)
    }
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    config: CameraConfig,
    /// Horizontal angle (degrees)
    yaw: f64,
    /// Vertical angle (degrees), always within the configured limits
    pitch: f64,
    distance: f64,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            yaw: config.initial_yaw,
            pitch: config
                .initial_pitch
                .clamp(config.min_y_angle, config.max_y_angle),
            distance: config
                .distance
                .clamp(config.min_distance, config.max_distance),
            config,
        }
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Apply one frame of zoom and drag input.
    pub fn update(&mut self, input: &OrbitInput) {
        self.distance -= input.scroll * self.config.zoom_speed;
        self.distance = self
            .distance
            .clamp(self.config.min_distance, self.config.max_distance);

        if input.drag_held {
            self.yaw += input.drag_delta.x * self.config.rotation_speed;
            self.pitch -= input.drag_delta.y * self.config.rotation_speed;
            self.pitch = self
                .pitch
                .clamp(self.config.min_y_angle, self.config.max_y_angle);
        }
    }

    pub fn rotation(&self) -> DQuat {
        DQuat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            0.0,
        )
    }

    /// Camera placement looking at `target`.
    pub fn pose(&self, target: DVec3) -> CameraPose {
        let rotation = self.rotation();
        let position = target + rotation * DVec3::new(0.0, 0.0, -self.distance);
        CameraPose {
            position,
            rotation,
            target,
        }
    }
}
