//! Missile Dodge - guided-missile evasion simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, steering, spawning, collisions)
//! - `controller`: Menu/run state machine driving the simulation each frame
//! - `highscores`: Leaderboard and the injected score store
//! - `settings`: Data-driven tuning and mission route
//! - `error`: Configuration and transition errors

pub mod controller;
pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use controller::{Phase, RunObserver, SimulationLoop, TraversalStats};
pub use error::{ConfigError, TransitionError};
pub use highscores::{HighScores, MemoryScoreStore, ScoreStore};
pub use settings::SimConfig;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference tick rate that "per tick" tuning values are expressed in
    pub const REFERENCE_HZ: f32 = 60.0;
    /// Upper bound on a single simulation step (frame-drop guard)
    pub const MAX_DT: f32 = 0.1;

    /// Default playfield (portrait phone screen)
    pub const PLAYFIELD_WIDTH: f32 = 720.0;
    pub const PLAYFIELD_HEIGHT: f32 = 1280.0;
    /// Entities this far outside the playfield are culled
    pub const BOUNDS_MARGIN: f32 = 100.0;

    /// Arcade craft
    pub const ARCADE_CRAFT_SPEED: f32 = 420.0;
    pub const ARCADE_CRAFT_RADIUS: f32 = 20.0;
    /// Distance at which the arcade craft stops chasing its target point
    pub const ARCADE_ARRIVE_RADIUS: f32 = 10.0;

    /// Mission craft (per reference tick)
    pub const MISSION_CRAFT_RADIUS: f32 = 22.0;
    pub const MISSION_CRAFT_HEALTH: i32 = 100;
    /// Upper bound for a configured mission craft health
    pub const MAX_CRAFT_HEALTH: i32 = 100;
    pub const MISSION_ACCEL_PER_TICK: f32 = 0.4;
    pub const MISSION_DECEL_PER_TICK: f32 = 0.3;
    pub const MISSION_MAX_SPEED_PER_TICK: f32 = 4.0;

    /// Combo streak
    pub const COMBO_TIMEOUT: f32 = 5.0;
    pub const COMBO_MAX_MULTIPLIER: f32 = 5.0;
    /// Expiry farther than this from the craft counts as an evasion
    pub const EVASION_DISTANCE: f32 = 100.0;
    /// Every Nth streak increment (evasion or intercept) pays `100 * streak`
    pub const STREAK_BONUS_EVERY: u32 = 5;

    /// Arcade waves
    pub const ARCADE_SPAWN_INTERVAL: f32 = 1.2;
    pub const WAVE_START_POINTS: u64 = 10;
    pub const WAVE_CLEAR_POINTS: u64 = 100;

    /// Mission scoring
    pub const INTERCEPT_POINTS: f32 = 50.0;
    pub const DISTANCE_POINTS_PER_KM: f32 = 10.0;
    pub const TIME_POINTS_PER_SEC: f32 = 5.0;
    pub const KILL_POINTS: u64 = 50;
    pub const COMPLETION_BONUS: u64 = 100_000;

    /// Mission world
    pub const WORLD_LENGTH: f32 = 60_000.0;
    pub const SCROLL_SPEED: f32 = 240.0;
    pub const UNITS_PER_KM: f32 = 100.0;

    /// Explosion effect lifetime (seconds)
    pub const EXPLOSION_TTL: f32 = 0.5;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Scale a per-reference-tick factor (e.g. velocity *= 0.95 each tick) to `dt`
#[inline]
pub fn per_tick_decay(factor: f32, dt: f32) -> f32 {
    factor.powf(dt * consts::REFERENCE_HZ)
}
