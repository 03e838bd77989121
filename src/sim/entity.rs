//! Base simulated body and the playfield it lives in

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::BOUNDS_MARGIN;

/// Position, velocity and collision radius shared by every entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Body {
    /// Panics on a non-positive radius; all radii come from validated tuning.
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        assert!(radius > 0.0, "body radius must be positive, got {radius}");
        Self { pos, vel, radius }
    }

    /// Advance position by `vel * dt`
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Circle-circle overlap
    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        super::collision::circles_overlap(self.pos, self.radius, other.pos, other.radius)
    }
}

/// Axis-aligned screen rectangle with origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// On screen, edges inclusive
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }

    /// True while `pos` is no more than `BOUNDS_MARGIN` outside the screen
    pub fn contains_with_margin(&self, pos: Vec2) -> bool {
        pos.x >= -BOUNDS_MARGIN
            && pos.x <= self.width + BOUNDS_MARGIN
            && pos.y >= -BOUNDS_MARGIN
            && pos.y <= self.height + BOUNDS_MARGIN
    }

    /// Clamp a point so a circle of `radius` stays fully on screen
    pub fn clamp_inside(&self, pos: Vec2, radius: f32) -> Vec2 {
        let r = radius.min(self.width * 0.5).min(self.height * 0.5);
        pos.clamp(Vec2::splat(r), Vec2::new(self.width - r, self.height - r))
    }
}
