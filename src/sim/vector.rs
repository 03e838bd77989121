//! 2D vector helpers
//!
//! `glam::Vec2` is the vector value type; it already provides add/sub/scale,
//! `length`, `distance` and `normalize_or_zero`. This adds the steering
//! operations the simulation needs on top.

use glam::Vec2;

/// Vector value type used throughout the simulation
pub type Vector2D = Vec2;

pub trait VectorExt {
    /// Rotate counter-clockwise (in math orientation) by `angle` radians
    fn rotated(self, angle: f32) -> Vec2;
    /// Signed angle from `self` to `other` in (-π, π]; 0 if either is zero
    fn signed_angle_to(self, other: Vec2) -> f32;
    /// Unit vector in the direction of travel, or `fallback` when stationary
    fn heading_or(self, fallback: Vec2) -> Vec2;
}

impl VectorExt for Vec2 {
    #[inline]
    fn rotated(self, angle: f32) -> Vec2 {
        Vec2::from_angle(angle).rotate(self)
    }

    #[inline]
    fn signed_angle_to(self, other: Vec2) -> f32 {
        if self == Vec2::ZERO || other == Vec2::ZERO {
            return 0.0;
        }
        self.perp_dot(other).atan2(self.dot(other))
    }

    #[inline]
    fn heading_or(self, fallback: Vec2) -> Vec2 {
        let heading = self.normalize_or_zero();
        if heading == Vec2::ZERO {
            fallback.normalize_or_zero()
        } else {
            heading
        }
    }
}

/// Unit vector from `from` toward `to` (zero if coincident)
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
