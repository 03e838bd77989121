//! Simulation tuning and mission route
//!
//! Loaded from JSON by the host; every field has a default so partial files
//! work.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::entity::Playfield;
use crate::sim::projectile::ProjectileKind;
use crate::sim::world::{WorldPartition, contiguous_segments};

/// One leg of the mission route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub name: String,
    /// World units covered by this leg
    pub length: f32,
    pub spawn_rate_base: f32,
    pub allowed_kinds: Vec<ProjectileKind>,
}

impl RouteLeg {
    fn new(name: &str, length: f32, spawn_rate_base: f32, allowed_kinds: &[ProjectileKind]) -> Self {
        Self {
            name: name.to_string(),
            length,
            spawn_rate_base,
            allowed_kinds: allowed_kinds.to_vec(),
        }
    }
}

/// Tuning for a simulation instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed; each run derives its own from this
    pub seed: u64,

    // === Playfield ===
    pub playfield_width: f32,
    /// Also the mission viewport height
    pub playfield_height: f32,
    /// Largest step a single update may take (seconds)
    pub max_dt: f32,

    // === Craft ===
    pub arcade_craft_speed: f32,
    pub arcade_craft_radius: f32,
    pub mission_craft_radius: f32,
    pub mission_craft_health: i32,

    // === Arcade ===
    pub arcade_spawn_interval: f32,

    // === Mission ===
    pub world_length: f32,
    pub scroll_speed: f32,
    pub units_per_km: f32,
    pub route: Vec<RouteLeg>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,

            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            max_dt: MAX_DT,

            arcade_craft_speed: ARCADE_CRAFT_SPEED,
            arcade_craft_radius: ARCADE_CRAFT_RADIUS,
            mission_craft_radius: MISSION_CRAFT_RADIUS,
            mission_craft_health: MISSION_CRAFT_HEALTH,

            arcade_spawn_interval: ARCADE_SPAWN_INTERVAL,

            world_length: WORLD_LENGTH,
            scroll_speed: SCROLL_SPEED,
            units_per_km: UNITS_PER_KM,
            route: default_route(),
        }
    }
}

/// Eight legs of 7.5k units, roster and pressure rising toward the capital
pub fn default_route() -> Vec<RouteLeg> {
    use ProjectileKind::*;
    vec![
        RouteLeg::new("Coastal Plain", 7500.0, 0.03, &[Standard]),
        RouteLeg::new("Farmland", 7500.0, 0.035, &[Standard, Fast]),
        RouteLeg::new("River Delta", 7500.0, 0.04, &[Standard, Fast, Zigzag]),
        RouteLeg::new("Foothills", 7500.0, 0.045, &[Fast, Zigzag, Homing, Heavy]),
        RouteLeg::new("Industrial Zone", 7500.0, 0.05, &[Standard, Homing, Splitting, Heavy]),
        RouteLeg::new("Mountain Pass", 7500.0, 0.055, &[Zigzag, Homing, Teleporting, Sniper]),
        RouteLeg::new("Radar Belt", 7500.0, 0.065, &[Fast, Splitting, Teleporting, Sniper, Mirror]),
        RouteLeg::new(
            "Capital Approach",
            7500.0,
            0.08,
            &[Standard, Fast, Zigzag, Homing, Heavy, Splitting, Teleporting, Sniper, Mirror],
        ),
    ]
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn playfield(&self) -> Playfield {
        Playfield::new(self.playfield_width, self.playfield_height)
    }

    /// Check every invariant a run relies on, including the route
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.playfield_width > 0.0 && self.playfield_height > 0.0) {
            return Err(ConfigError::InvalidPlayfield {
                width: self.playfield_width,
                height: self.playfield_height,
            });
        }
        for (what, value) in [
            ("max dt", self.max_dt),
            ("arcade craft speed", self.arcade_craft_speed),
            ("arcade craft radius", self.arcade_craft_radius),
            ("mission craft radius", self.mission_craft_radius),
            ("mission craft health", self.mission_craft_health as f32),
            ("arcade spawn interval", self.arcade_spawn_interval),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { what, value });
            }
        }
        if self.mission_craft_health > MAX_CRAFT_HEALTH {
            return Err(ConfigError::HealthOutOfRange {
                value: self.mission_craft_health,
                max: MAX_CRAFT_HEALTH,
            });
        }
                self.build_world().map(|_| ())
    }

    /// Lay the route out end to end into a fresh world
    pub fn build_world(&self) -> Result<WorldPartition, ConfigError> {
        let segments = contiguous_segments(self.route.iter().map(|leg| {
            (
                leg.name.clone(),
                leg.length,
                leg.spawn_rate_base,
                leg.allowed_kinds.clone(),
            )
        }));
        WorldPartition::new(
            segments,
            self.world_length,
            self.playfield_height,
            self.scroll_speed,
            self.units_per_km,
        )
    }
}
