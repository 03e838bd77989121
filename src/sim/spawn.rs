//! Spawn scheduling for both game modes
//!
//! Arcade: discrete waves with a quota and a per-wave weighted kind table.
//! Mission: per-tick spawn roll driven by the active world segment.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Playfield};
use super::projectile::ProjectileKind;
use super::state::SimRng;
use super::vector::{VectorExt, direction};
use super::world::WorldPartition;
use crate::consts::{BOUNDS_MARGIN, WAVE_START_POINTS};

use ProjectileKind::*;

/// Cumulative-weight tables by wave (percent weights, each sums to 100).
/// Wave 8 and later use the last row.
const WAVE_TABLES: [&[(ProjectileKind, u32)]; 8] = [
    &[(Standard, 100)],
    &[(Standard, 50), (Fast, 50)],
    &[(Standard, 40), (Fast, 30), (Zigzag, 30)],
    &[(Standard, 30), (Fast, 25), (Zigzag, 25), (Homing, 20)],
    &[(Standard, 25), (Fast, 20), (Zigzag, 20), (Homing, 20), (Splitting, 15)],
    &[
        (Standard, 20),
        (Fast, 18),
        (Zigzag, 17),
        (Homing, 17),
        (Splitting, 14),
        (Teleporting, 14),
    ],
    &[
        (Standard, 16),
        (Fast, 15),
        (Zigzag, 15),
        (Homing, 15),
        (Splitting, 13),
        (Teleporting, 13),
        (Sniper, 13),
    ],
    &[
        (Standard, 12),
        (Fast, 12),
        (Zigzag, 12),
        (Homing, 12),
        (Splitting, 11),
        (Teleporting, 11),
        (Sniper, 10),
        (Mirror, 10),
        (Heavy, 10),
    ],
];

/// Kind-weight table for a 1-based wave index
pub fn wave_table(wave: u32) -> &'static [(ProjectileKind, u32)] {
    let idx = (wave.max(1) as usize - 1).min(WAVE_TABLES.len() - 1);
    WAVE_TABLES[idx]
}

/// Draw from a cumulative weight table
pub fn pick_weighted(table: &[(ProjectileKind, u32)], rng: &mut SimRng) -> ProjectileKind {
    let total: u32 = table.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return Standard;
    }
    let roll = rng.random_range(0..total);
    let mut cumulative = 0;
    for &(kind, weight) in table {
        cumulative += weight;
        if roll < cumulative {
            return kind;
        }
    }
    table[table.len() - 1].0
}

/// Arcade wave progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcadeWaves {
    /// 1-based; 0 before the first wave starts
    pub wave: u32,
    pub quota: u32,
    pub spawned: u32,
    pub interval: f32,
    spawn_timer: f32,
}

impl ArcadeWaves {
    pub fn new(interval: f32) -> Self {
        Self {
            wave: 0,
            quota: 0,
            spawned: 0,
            interval,
            spawn_timer: 0.0,
        }
    }

    /// Begin the next wave; returns the wave-start points
    pub fn start_next(&mut self) -> u64 {
        self.wave += 1;
        self.quota = self.wave;
        self.spawned = 0;
        self.spawn_timer = 0.0;
        log::info!("Wave {} started (quota {})", self.wave, self.quota);
        WAVE_START_POINTS * self.wave as u64
    }

    /// Advance the spawn timer; yields a kind each time one is due
    pub fn tick(&mut self, dt: f32, rng: &mut SimRng) -> Option<ProjectileKind> {
        if self.quota_spawned() {
            return None;
        }
        self.spawn_timer += dt;
        if self.spawn_timer < self.interval {
            return None;
        }
        self.spawn_timer -= self.interval;
        self.spawned += 1;
        Some(pick_weighted(wave_table(self.wave), rng))
    }

    pub fn quota_spawned(&self) -> bool {
        self.spawned >= self.quota
    }

    /// Cleared once the quota is out and none of this wave's projectiles remain
    pub fn is_cleared(&self, live_from_wave: usize) -> bool {
        self.wave > 0 && self.quota_spawned() && live_from_wave == 0
    }
}

/// Spawn-rate scaling within a segment: calm entry, busy exit
pub fn intensity_multiplier(segment_progress: f32) -> f32 {
    if segment_progress < 0.2 {
        0.7
    } else if segment_progress < 0.8 {
        1.0
    } else {
        1.3
    }
}

/// Chance of a spawn this tick
pub fn spawn_probability(spawn_rate_base: f32, segment_progress: f32, dt: f32) -> f32 {
    spawn_rate_base * intensity_multiplier(segment_progress) * dt * 20.0
}

/// Roll for a mission spawn; the kind is uniform over the segment roster
pub fn roll_mission_spawn(world: &WorldPartition, dt: f32, rng: &mut SimRng) -> Option<ProjectileKind> {
    let segment = world.current_segment();
    let chance = spawn_probability(segment.spawn_rate_base, world.segment_progress(), dt);
    if rng.random::<f32>() >= chance {
        return None;
    }
    let kinds = &segment.allowed_kinds;
    Some(kinds[rng.random_range(0..kinds.len())])
}

/// Random point on one of the four edges, pushed out by the bounds margin
pub fn edge_spawn_point(field: &Playfield, rng: &mut SimRng) -> Vec2 {
    let m = BOUNDS_MARGIN;
    match rng.random_range(0..4u32) {
        0 => Vec2::new(rng.random_range(0.0..field.width), -m),
        1 => Vec2::new(field.width + m, rng.random_range(0.0..field.height)),
        2 => Vec2::new(rng.random_range(0.0..field.width), field.height + m),
        _ => Vec2::new(-m, rng.random_range(0.0..field.height)),
    }
}

/// Arcade launch: straight at the craft at cruise speed
pub fn arcade_launch_velocity(kind: ProjectileKind, spawn: Vec2, craft_pos: Vec2) -> Vec2 {
    direction(spawn, craft_pos).heading_or(Vec2::Y) * kind.stats().speed
}

/// Mission launch: lead the craft with a jittered prediction, faster later
/// in the mission
pub fn mission_launch_velocity(
    kind: ProjectileKind,
    spawn: Vec2,
    craft: &Body,
    mission_progress: f32,
    rng: &mut SimRng,
) -> Vec2 {
    let prediction_time = rng.random_range(0.8..=1.2);
    let jitter = Vec2::new(rng.random_range(-100.0..=100.0), rng.random_range(-100.0..=100.0));
    let aim = craft.pos + craft.vel * prediction_time + jitter;
    let scale = 0.6 + 0.4 * mission_progress.clamp(0.0, 1.0);
    direction(spawn, aim).heading_or(craft.pos - spawn) * kind.stats().speed * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::contiguous_segments;
    use rand::SeedableRng;

    fn rng() -> SimRng {
        SimRng::seed_from_u64(42)
    }

    #[test]
    fn test_tables_sum_to_100_and_grow() {
        let mut prev = 0;
        for wave in 1..=10 {
            let table = wave_table(wave);
            assert_eq!(table.iter().map(|(_, w)| w).sum::<u32>(), 100, "wave {wave}");
            assert!(table.len() >= prev);
            prev = table.len();
        }
        assert_eq!(wave_table(1), &[(Standard, 100)]);
        assert_eq!(wave_table(8).len(), 9);
        assert_eq!(wave_table(50), wave_table(8));
    }

    #[test]
    fn test_wave_one_is_standard_only() {
        let mut rng = rng();
        for _ in 0..200 {
            assert_eq!(pick_weighted(wave_table(1), &mut rng), Standard);
        }
    }

    #[test]
    fn test_wave_two_is_roughly_even() {
        let mut rng = rng();
        let fast = (0..2000)
            .filter(|_| pick_weighted(wave_table(2), &mut rng) == Fast)
            .count();
        assert!((800..1200).contains(&fast), "fast draws {fast}");
    }

    #[test]
    fn test_quota_spawns_on_interval() {
        let mut rng = rng();
        let mut waves = ArcadeWaves::new(1.2);
        assert_eq!(waves.start_next(), 10);
        assert_eq!(waves.start_next(), 20);
        assert_eq!(waves.quota, 2);

        let mut spawned = 0;
        for _ in 0..(60 * 5) {
            if waves.tick(1.0 / 60.0, &mut rng).is_some() {
                spawned += 1;
            }
        }
        assert_eq!(spawned, 2);
        assert!(waves.quota_spawned());
    }

    #[test]
    fn test_wave_not_cleared_while_live_or_unspawned() {
        let mut rng = rng();
        let mut waves = ArcadeWaves::new(1.2);
        assert!(!waves.is_cleared(0));
        waves.start_next();
        assert!(!waves.is_cleared(0));
        while waves.tick(0.1, &mut rng).is_none() {}
        assert!(!waves.is_cleared(1));
        assert!(waves.is_cleared(0));
    }

    #[test]
    fn test_intensity_bands() {
        assert_eq!(intensity_multiplier(0.0), 0.7);
        assert_eq!(intensity_multiplier(0.19), 0.7);
        assert_eq!(intensity_multiplier(0.2), 1.0);
        assert_eq!(intensity_multiplier(0.79), 1.0);
        assert_eq!(intensity_multiplier(0.8), 1.3);
        assert!((spawn_probability(0.5, 0.5, 0.1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mission_roll_uses_segment_roster() {
        let mut rng = rng();
        let segs = contiguous_segments([
            ("Only".to_string(), 2000.0, 10.0, vec![Heavy, Mirror]),
        ]);
        let world = WorldPartition::new(segs, 2000.0, 500.0, 100.0, 100.0).unwrap();
        for _ in 0..100 {
            let kind = roll_mission_spawn(&world, 0.1, &mut rng).unwrap();
            assert!(kind == Heavy || kind == Mirror);
        }

        let quiet = contiguous_segments([("Quiet".to_string(), 2000.0, 0.0, vec![Standard])]);
        let world = WorldPartition::new(quiet, 2000.0, 500.0, 100.0, 100.0).unwrap();
        for _ in 0..100 {
            assert!(roll_mission_spawn(&world, 0.1, &mut rng).is_none());
        }
    }

    #[test]
    fn test_edge_points_sit_on_margin() {
        let mut rng = rng();
        let field = Playfield::new(720.0, 1280.0);
        for _ in 0..200 {
            let p = edge_spawn_point(&field, &mut rng);
            let on_edge = p.x == -BOUNDS_MARGIN
                || p.x == 720.0 + BOUNDS_MARGIN
                || p.y == -BOUNDS_MARGIN
                || p.y == 1280.0 + BOUNDS_MARGIN;
            assert!(on_edge, "{p:?}");
            assert!(field.contains_with_margin(p));
        }
    }

    #[test]
    fn test_mission_launch_speed_scales_with_progress() {
        let mut rng = rng();
        let craft = Body::new(Vec2::new(360.0, 1000.0), Vec2::ZERO, 22.0);
        let early = mission_launch_velocity(Standard, Vec2::new(-100.0, 0.0), &craft, 0.0, &mut rng);
        let late = mission_launch_velocity(Standard, Vec2::new(-100.0, 0.0), &craft, 1.0, &mut rng);
        assert!((early.length() - 120.0).abs() < 1e-2);
        assert!((late.length() - 200.0).abs() < 1e-2);
        // Roughly toward the craft
        assert!(early.x > 0.0 && early.y > 0.0);
    }
}
