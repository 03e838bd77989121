//! Error types
//!
//! Configuration problems are fatal when a run or world is built. Nothing in
//! the per-tick path returns an error.

use thiserror::Error;

use crate::sim::ProjectileKind;

/// Invalid tuning or route data, detected at load time
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("playfield must have positive size, got {width}x{height}")]
    InvalidPlayfield { width: f32, height: f32 },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f32 },

    #[error("mission craft health must be within 1..={max}, got {value}")]
    HealthOutOfRange { value: i32, max: i32 },

    #[error("mission route has no segments")]
    EmptyRoute,

    #[error("segment {index} ({name}) starts at {found}, expected {expected}")]
    SegmentGap {
        index: usize,
        name: String,
        expected: f32,
        found: f32,
    },

    #[error("segment {index} ({name}) has non-positive length")]
    EmptySegment { index: usize, name: String },

    #[error("segment {index} ({name}) allows no projectile kinds")]
    EmptyRoster { index: usize, name: String },

    #[error("segment {index} ({name}) has negative spawn rate {rate}")]
    NegativeSpawnRate { index: usize, name: String, rate: f32 },

    #[error("route ends at {end} but world length is {length}")]
    RouteLengthMismatch { end: f32, length: f32 },

    #[error("world length {length} must exceed viewport height {viewport}")]
    WorldTooShort { length: f32, viewport: f32 },

    #[error("duplicate kind {kind:?} in roster of segment {index}")]
    DuplicateKind { index: usize, kind: ProjectileKind },

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A controller action that is not valid in the current phase
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {action} while {phase}")]
pub struct TransitionError {
    pub action: &'static str,
    pub phase: &'static str,
}
