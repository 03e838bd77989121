//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulated time only (pausing never advances timers)
//! - Seeded RNG only, one per run
//! - No rendering or platform dependencies

pub mod collision;
pub mod combo;
pub mod craft;
pub mod entity;
pub mod projectile;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod vector;
pub mod world;

pub use collision::{Circle, circles_overlap, overlapping_pairs};
pub use combo::ComboTracker;
pub use craft::{ArcadeCraft, Craft, MissionCraft};
pub use entity::{Body, Playfield};
pub use projectile::{Projectile, ProjectileKind, Removal, SteerEvent, SteerState, Target};
pub use spawn::{ArcadeWaves, wave_table};
pub use state::{
    CraftView, Explosion, GameEvent, Mode, Outcome, ProjectileId, ProjectileView, RunState,
    RunStats, Schedule, SegmentView, SimRng, Snapshot,
};
pub use tick::tick;
pub use vector::{Vector2D, VectorExt};
pub use world::{WorldPartition, WorldSegment};
