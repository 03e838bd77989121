//! Run state and core simulation types
//!
//! One `RunState` exists per active run. Everything the tick mutates lives
//! here, including the run's seeded RNG.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::combo::ComboTracker;
use super::craft::{ArcadeCraft, Craft, MissionCraft};
use super::entity::Playfield;
use super::projectile::{Projectile, ProjectileKind};
use super::spawn::ArcadeWaves;
use super::world::WorldPartition;
use crate::error::ConfigError;
use crate::settings::SimConfig;

/// The one RNG type threaded through spawning and steering
pub type SimRng = Pcg32;

slotmap::new_key_type! {
    /// Generation-tagged handle to a live projectile
    pub struct ProjectileId;
}

/// Which game is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Endless waves, one hit ends the run
    Arcade,
    /// Fly the scrolling route with a health bar
    Mission,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Arcade => "Arcade",
            Mode::Mission => "Mission",
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Craft destroyed
    Failure,
    /// World traversed
    Success,
}

/// Results handed to the presentation layer when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub score: u64,
    pub distance_km: f32,
    pub kills: u32,
    pub elapsed: f32,
}

/// Visual-only burst left by an intercept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub age: f32,
    pub ttl: f32,
}

/// Things that happened during a tick, drained by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32, bonus: u64 },
    SegmentEntered { index: usize, name: String },
    Spawned { kind: ProjectileKind, pos: Vec2 },
    Split { pos: Vec2 },
    Teleported { from: Vec2, to: Vec2 },
    SniperLaunched { aim: Vec2 },
    Intercept { pos: Vec2, points: u64 },
    Evaded { kind: ProjectileKind, streak: u32 },
    ComboBonus { streak: u32, points: u64 },
    CraftHit { kind: ProjectileKind, damage: i32, health: Option<i32> },
    CraftDestroyed { score: u64 },
    TraversalComplete(RunStats),
}

/// Mode-specific scheduling state
#[derive(Debug, Clone)]
pub enum Schedule {
    Arcade(ArcadeWaves),
    Mission {
        world: WorldPartition,
        /// Last segment index announced
        segment: usize,
    },
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub mode: Mode,
    pub seed: u64,
    pub score: u64,
    /// Simulated seconds; drives every internal timer
    pub elapsed: f32,
    /// Largest step a single tick may take (seconds)
    pub max_dt: f32,
    pub field: Playfield,
    pub craft: Craft,
    pub projectiles: SlotMap<ProjectileId, Projectile>,
    pub explosions: Vec<Explosion>,
    pub combo: ComboTracker,
    /// Projectile-projectile intercepts
    pub kills: u32,
    pub evasions: u32,
    pub schedule: Schedule,
    pub outcome: Option<Outcome>,
    pub events: Vec<GameEvent>,
    pub rng: SimRng,
    next_family: u32,
}

impl RunState {
    fn base(mode: Mode, seed: u64, config: &SimConfig, craft: Craft, schedule: Schedule) -> Self {
        Self {
            mode,
            seed,
            score: 0,
            elapsed: 0.0,
            max_dt: config.max_dt,
            field: config.playfield(),
            craft,
            projectiles: SlotMap::with_key(),
            explosions: Vec::new(),
            combo: ComboTracker::default(),
            kills: 0,
            evasions: 0,
            schedule,
            outcome: None,
            events: Vec::new(),
            rng: SimRng::seed_from_u64(seed),
            next_family: 1,
        }
    }

    /// New arcade run, already into wave 1
    pub fn arcade(config: &SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let field = config.playfield();
        let craft = Craft::Arcade(ArcadeCraft::new(
            field.center(),
            config.arcade_craft_radius,
            config.arcade_craft_speed,
        ));
        let schedule = Schedule::Arcade(ArcadeWaves::new(config.arcade_spawn_interval));
        let mut state = Self::base(Mode::Arcade, seed, config, craft, schedule);
        state.start_next_wave();
        log::info!("Arcade run started with seed {}", seed);
        Ok(state)
    }

    /// New mission run over a prebuilt world
    pub fn mission(config: &SimConfig, world: WorldPartition, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let field = config.playfield();
        let start = Vec2::new(field.width * 0.5, field.height * 0.8);
        let craft = Craft::Mission(MissionCraft::new(
            start,
            config.mission_craft_radius,
            config.mission_craft_health,
        ));
        let segment = world.segment_index();
        let name = world.current_segment().name.clone();
        let schedule = Schedule::Mission { world, segment };
        let mut state = Self::base(Mode::Mission, seed, config, craft, schedule);
        state.events.push(GameEvent::SegmentEntered { index: segment, name });
        log::info!("Mission run started with seed {}", seed);
        Ok(state)
    }

    /// Start the next arcade wave and bank its start points
    pub(crate) fn start_next_wave(&mut self) {
        if let Schedule::Arcade(waves) = &mut self.schedule {
            self.score += waves.start_next();
            self.events.push(GameEvent::WaveStarted { wave: waves.wave });
        }
    }

    /// Insert a freshly launched projectile under a new lineage
    pub fn spawn(&mut self, projectile: Projectile) -> ProjectileId {
        let family = self.next_family;
        self.next_family = self.next_family.wrapping_add(1);
        self.events.push(GameEvent::Spawned {
            kind: projectile.kind,
            pos: projectile.body.pos,
        });
        self.projectiles.insert(projectile.with_family(family))
    }

    pub fn live_projectiles(&self) -> impl Iterator<Item = (ProjectileId, &Projectile)> {
        self.projectiles.iter().filter(|(_, p)| p.is_live())
    }

    /// Current arcade wave (1-based)
    pub fn wave_index(&self) -> Option<u32> {
        match &self.schedule {
            Schedule::Arcade(waves) => Some(waves.wave),
            Schedule::Mission { .. } => None,
        }
    }

    pub fn world(&self) -> Option<&WorldPartition> {
        match &self.schedule {
            Schedule::Arcade(_) => None,
            Schedule::Mission { world, .. } => Some(world),
        }
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            score: self.score,
            distance_km: self.world().map(|w| w.distance_km()).unwrap_or(0.0),
            kills: self.kills,
            elapsed: self.elapsed,
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only render feed
    pub fn snapshot(&self) -> Snapshot {
        let craft = self.craft.body();
        let world = self.world();
        Snapshot {
            mode: self.mode,
            score: self.score,
            elapsed: self.elapsed,
            craft: CraftView {
                pos: craft.pos,
                vel: craft.vel,
                radius: craft.radius,
                health: self.craft.health(),
            },
            projectiles: self
                .live_projectiles()
                .map(|(_, p)| ProjectileView {
                    kind: p.kind,
                    pos: p.body.pos,
                    vel: p.body.vel,
                    radius: p.body.radius,
                    charging: p.is_charging(),
                })
                .collect(),
            explosions: self.explosions.clone(),
            streak: self.combo.streak,
            multiplier: self.combo.multiplier,
            wave: self.wave_index(),
            segment: world.map(|w| SegmentView {
                index: w.segment_index(),
                name: w.current_segment().name.clone(),
                progress: w.segment_progress(),
                distance_km: w.distance_km(),
                remaining_km: w.remaining_km(),
                eta_seconds: w.eta_seconds(),
            }),
            outcome: self.outcome,
        }
    }
}

/// Per-frame draw data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub score: u64,
    pub elapsed: f32,
    pub craft: CraftView,
    /// Draw order: arena order
    pub projectiles: Vec<ProjectileView>,
    pub explosions: Vec<Explosion>,
    pub streak: u32,
    pub multiplier: f32,
    pub wave: Option<u32>,
    pub segment: Option<SegmentView>,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CraftView {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Sniper still aiming
    pub charging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentView {
    pub index: usize,
    pub name: String,
    pub progress: f32,
    pub distance_km: f32,
    pub remaining_km: f32,
    pub eta_seconds: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arcade_starts_in_wave_one() {
        let mut state = RunState::arcade(&SimConfig::default(), 1).unwrap();
        assert_eq!(state.wave_index(), Some(1));
        assert_eq!(state.score, 10);
        assert!(state.world().is_none());
        assert_eq!(state.drain_events(), vec![GameEvent::WaveStarted { wave: 1 }]);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected_before_building_bodies() {
        let mut config = SimConfig::default();
        config.arcade_craft_radius = 0.0;
        assert!(matches!(
            RunState::arcade(&config, 1),
            Err(ConfigError::NonPositive { .. })
        ));

        let world = SimConfig::default().build_world().unwrap();
        let mut config = SimConfig::default();
        config.mission_craft_radius = -3.0;
        assert!(RunState::mission(&config, world, 1).is_err());
    }

    #[test]
    fn test_run_carries_configured_max_dt() {
        let mut config = SimConfig::default();
        config.max_dt = 0.25;
        let state = RunState::arcade(&config, 1).unwrap();
        assert_eq!(state.max_dt, 0.25);
    }

    #[test]
    fn test_spawn_assigns_distinct_families() {
        let config = SimConfig::default();
        let mut state = RunState::mission(&config, config.build_world().unwrap(), 3).unwrap();
        let a = Projectile::new(ProjectileKind::Standard, Vec2::ZERO, Vec2::X, &mut state.rng);
        let b = Projectile::new(ProjectileKind::Fast, Vec2::ZERO, Vec2::X, &mut state.rng);
        let ia = state.spawn(a);
        let ib = state.spawn(b);
        assert_ne!(state.projectiles[ia].family, state.projectiles[ib].family);
        assert_eq!(state.live_projectiles().count(), 2);
    }

    #[test]
    fn test_snapshot_reports_mission_hud() {
        let config = SimConfig::default();
        let state = RunState::mission(&config, config.build_world().unwrap(), 3).unwrap();
        let snap = state.snapshot();
        assert_eq!(snap.mode, Mode::Mission);
        assert_eq!(snap.craft.health, Some(100));
        assert_eq!(snap.wave, None);
        let seg = snap.segment.unwrap();
        assert_eq!(seg.index, 0);
        assert_eq!(seg.distance_km, 0.0);
    }
}
