//! Ellipsoidal bowl geometry.

use glam::DVec3;
use spintop_shared::config::BowlConfig;

use crate::body::Body;

/// Outward unit normal of an axis-aligned ellipsoid with the given radii,
/// taken from the gradient of its implicit equation at `offset`. This is
/// exact on the surface and used as an approximation everywhere else.
/// A zero offset yields the zero vector.
pub fn ellipsoid_normal(offset: DVec3, radii: DVec3) -> DVec3 {
    (offset / (radii * radii)).normalize_or_zero()
}

/// Component of `v` perpendicular to the unit (or zero) normal `n`.
pub fn project_on_plane(v: DVec3, n: DVec3) -> DVec3 {
    v - n * v.dot(n)
}

#[derive(Debug, Clone, Copy)]
pub struct Bowl {
    pub center: DVec3,
    pub radii: DVec3,
    pub slope_accel: f64,
}

impl Bowl {
    pub fn new(config: &BowlConfig) -> Self {
        Self {
            center: config.center,
            radii: config.radii,
            slope_accel: config.slope_accel,
        }
    }

    pub fn normal_at(&self, position: DVec3) -> DVec3 {
        ellipsoid_normal(position - self.center, self.radii)
    }

    /// Downhill acceleration along the surface with the given normal.
    /// Zero where gravity is parallel to the normal (the bottom of the bowl).
    pub fn slope_acceleration(&self, gravity: DVec3, normal: DVec3) -> DVec3 {
        project_on_plane(gravity, normal).normalize_or_zero() * self.slope_accel
    }

    /// Implicit value: < 1 inside, 1 on the surface, > 1 outside.
    pub fn level(&self, position: DVec3) -> f64 {
        let q = (position - self.center) / self.radii;
        q.length_squared()
    }

    /// Pull a body that left the bowl back onto its surface and strip the
    /// outward part of its velocity. Returns whether the body was touching.
    pub fn contain(&self, body: &mut Body) -> bool {
        let level = self.level(body.position);
        if level <= 1.0 {
            return false;
        }
        body.position = self.center + (body.position - self.center) / level.sqrt();

        let n = self.normal_at(body.position);
        let outward = body.velocity.dot(n);
        if outward > 0.0 {
            body.velocity -= n * outward;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spintop_shared::config::TopConfig;

    fn bowl() -> Bowl {
        Bowl::new(&BowlConfig::default())
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
    fn normal_is_unit_for_nonzero_offsets() {
        let bowl = bowl();
        let offsets = [
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(-300.0, -1500.0, 20.0),
            DVec3::new(1e-6, -1e-6, 1e-6),
            DVec3::new(5000.0, 5000.0, -5000.0),
        ];
        for p in offsets {
            let n = bowl.normal_at(p);
            assert!((n.length() - 1.0).abs() < 1e-12, "offset {:?}", p);
        }
    }

    #[test]
    fn normal_on_axes_points_outward() {
        let bowl = bowl();
        assert_vec3_close(bowl.normal_at(DVec3::new(0.0, -2000.0, 0.0)), DVec3::NEG_Y);
        assert_vec3_close(bowl.normal_at(DVec3::new(0.0, 0.0, 1000.0)), DVec3::Z);
    }

    #[test]
    fn normal_weights_axes_by_radii() {
        // Same offset on x and z; z radius is half, so z dominates 4:1.
        let n = ellipsoid_normal(DVec3::new(1.0, 0.0, 1.0), DVec3::new(2.0, 2.0, 1.0));
        assert!((n.z / n.x - 4.0).abs() < 1e-12);
    }

    #[test]
    fn normal_at_center_is_zero() {
        assert_eq!(bowl().normal_at(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn slope_is_tangent_and_downhill() {
        let bowl = bowl();
        let gravity = DVec3::new(0.0, -9.81, 0.0);
        let n = bowl.normal_at(DVec3::new(1200.0, -1200.0, 0.0));
        let slope = bowl.slope_acceleration(gravity, n);

        assert!((slope.length() - 800.0).abs() < 1e-9);
        assert!(slope.dot(n).abs() < 1e-9);
        assert!(slope.y < 0.0);
        assert!(slope.x < 0.0, "should slide toward the middle");
    }

    #[test]
    fn slope_vanishes_at_bottom() {
        let bowl = bowl();
        let n = bowl.normal_at(DVec3::new(0.0, -2000.0, 0.0));
        assert_eq!(
            bowl.slope_acceleration(DVec3::new(0.0, -9.81, 0.0), n),
            DVec3::ZERO
        );
    }

    #[test]
    fn contain_projects_escaped_body_to_surface() {
        let bowl = bowl();
        let mut body = Body::new(DVec3::new(0.0, -2500.0, 0.0), &TopConfig::default());
        body.velocity = DVec3::new(3.0, -10.0, 0.0);

        assert!(bowl.contain(&mut body));
        assert!((bowl.level(body.position) - 1.0).abs() < 1e-12);
        assert_vec3_close(body.velocity, DVec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn contain_keeps_inward_velocity() {
        let bowl = bowl();
        let mut body = Body::new(DVec3::new(0.0, -2100.0, 0.0), &TopConfig::default());
        body.velocity = DVec3::new(0.0, 4.0, 0.0);
        bowl.contain(&mut body);
        assert_vec3_close(body.velocity, DVec3::new(0.0, 4.0, 0.0));
    }

    #[test]
    fn contain_leaves_interior_bodies_alone() {
        let bowl = bowl();
        let start = DVec3::new(10.0, -500.0, 3.0);
        let mut body = Body::new(start, &TopConfig::default());
        assert!(!bowl.contain(&mut body));
        assert_eq!(body.position, start);
    }
}
