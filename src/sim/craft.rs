//! The player-controlled craft
//!
//! Arcade craft chase a target point and die to any hit. Mission craft steer
//! with inertial directional input and carry health.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Playfield};
use crate::consts::*;

/// Arcade craft: flies straight at the last touched point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcadeCraft {
    pub body: Body,
    pub target: Vec2,
    pub speed: f32,
}

impl ArcadeCraft {
    pub fn new(pos: Vec2, radius: f32, speed: f32) -> Self {
        Self {
            body: Body::new(pos, Vec2::ZERO, radius),
            target: pos,
            speed,
        }
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    pub fn update(&mut self, dt: f32, field: &Playfield) {
        // Targets near a wall are only reachable up to the clamp line
        let target = field.clamp_inside(self.target, self.body.radius);
        let to_target = target - self.body.pos;
        let dist = to_target.length();

        // Park inside the arrive radius to avoid jitter around the target
        if dist <= ARCADE_ARRIVE_RADIUS {
            self.body.vel = Vec2::ZERO;
            return;
        }

        // Don't overshoot on the last step
        let step_speed = self.speed.min(dist / dt.max(f32::EPSILON));
        self.body.vel = to_target / dist * step_speed;
        self.body.integrate(dt);
        self.body.pos = field.clamp_inside(self.body.pos, self.body.radius);
    }
}

/// Mission craft: accelerates toward held directions, coasts to a stop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionCraft {
    pub body: Body,
    /// Held direction, each axis in {-1, 0, 1}
    pub input: Vec2,
    pub health: i32,
    pub max_health: i32,
}

impl MissionCraft {
    pub fn new(pos: Vec2, radius: f32, health: i32) -> Self {
        Self {
            body: Body::new(pos, Vec2::ZERO, radius),
            input: Vec2::ZERO,
            health,
            max_health: health,
        }
    }

    /// Snap each axis to -1, 0 or 1
    pub fn set_input(&mut self, x: f32, y: f32) {
        self.input = Vec2::new(axis(x), axis(y));
    }

    pub fn update(&mut self, dt: f32, field: &Playfield) {
        // Per-tick tuning expressed in units/s and units/s²
        let hz = REFERENCE_HZ;
        let accel = MISSION_ACCEL_PER_TICK * hz * hz * dt;
        let decel = MISSION_DECEL_PER_TICK * hz * hz * dt;
        let max_speed = MISSION_MAX_SPEED_PER_TICK * hz;

        self.body.vel.x = step_axis(self.body.vel.x, self.input.x, accel, decel, max_speed);
        self.body.vel.y = step_axis(self.body.vel.y, self.input.y, accel, decel, max_speed);
        self.body.integrate(dt);

        let clamped = field.clamp_inside(self.body.pos, self.body.radius);
        if clamped.x != self.body.pos.x {
            self.body.vel.x = 0.0;
        }
        if clamped.y != self.body.pos.y {
            self.body.vel.y = 0.0;
        }
        self.body.pos = clamped;
    }

    /// Apply damage, clamping at zero; returns remaining health
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.health = (self.health - amount.max(0)).max(0);
        self.health
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0
    }
}

fn axis(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn step_axis(vel: f32, input: f32, accel: f32, decel: f32, max_speed: f32) -> f32 {
    if input != 0.0 {
        return (vel + input * accel).clamp(-max_speed, max_speed);
    }
    if vel.abs() <= decel {
        0.0
    } else {
        vel - vel.signum() * decel
    }
}

/// Whichever craft the current mode uses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Craft {
    Arcade(ArcadeCraft),
    Mission(MissionCraft),
}

impl Craft {
    pub fn body(&self) -> &Body {
        match self {
            Craft::Arcade(c) => &c.body,
            Craft::Mission(c) => &c.body,
        }
    }

    pub fn update(&mut self, dt: f32, field: &Playfield) {
        match self {
            Craft::Arcade(c) => c.update(dt, field),
            Craft::Mission(c) => c.update(dt, field),
        }
    }

    /// Health for mission craft; arcade craft have none
    pub fn health(&self) -> Option<i32> {
        match self {
            Craft::Arcade(_) => None,
            Craft::Mission(c) => Some(c.health),
        }
    }
}
