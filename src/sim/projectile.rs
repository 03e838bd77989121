//! Guided projectiles and their nine steering behaviors
//!
//! Each kind is a closed enum variant; `Projectile::update` dispatches on the
//! per-kind steering state every tick until the projectile's lifetime runs out.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Playfield};
use super::state::SimRng;
use super::vector::{VectorExt, direction};
use crate::{per_tick_decay, polar_to_cartesian};

/// Zigzag: lateral offset = sin(freq·2π·age + phase)·amplitude
pub const ZIGZAG_FREQUENCY: f32 = 4.0;
pub const ZIGZAG_AMPLITUDE: f32 = 1.2;
/// Homing wobble is a weaker, slower version of the zigzag
pub const HOMING_WOBBLE_FREQUENCY: f32 = 2.0;
pub const HOMING_WOBBLE_AMPLITUDE: f32 = 0.4;

/// Splitting: bursts once past this fraction of its lifetime
pub const SPLIT_AT_LIFETIME: f32 = 0.6;
pub const SPLIT_FRAGMENTS: usize = 3;
pub const FRAGMENT_RADIUS_SCALE: f32 = 0.7;
/// Per-reference-tick velocity factor after splitting
pub const SPLIT_DECAY_PER_TICK: f32 = 0.95;

/// Teleporting: relocation interval and ring around the target
pub const TELEPORT_INTERVAL_MIN: f32 = 2.0;
pub const TELEPORT_INTERVAL_MAX: f32 = 4.0;
pub const TELEPORT_RING_MIN: f32 = 100.0;
pub const TELEPORT_RING_MAX: f32 = 300.0;
pub const TELEPORT_JITTER: f32 = 0.25;

/// Sniper: charge window and launch multiplier
pub const SNIPER_CHARGE_TIME: f32 = 2.0;
pub const SNIPER_DECEL_PER_TICK: f32 = 0.8;
pub const SNIPER_LAUNCH_MULTIPLIER: f32 = 3.0;

/// Mirror: weight kept on the current heading each tick
pub const MIRROR_INERTIA: f32 = 0.8;

/// Slack for comparing accumulated float timers against fixed windows
const TIMER_EPSILON: f32 = 1e-4;

/// Behavioral variant of a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Standard,
    Fast,
    Zigzag,
    Homing,
    Heavy,
    Splitting,
    Teleporting,
    Sniper,
    Mirror,
}

/// Fixed tuning for one kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindStats {
    /// Cruise speed (units/s)
    pub speed: f32,
    /// Max turn rate (rad/s), only Standard turns at a fixed rate
    pub turn_rate: f32,
    /// Seconds until natural expiry
    pub max_lifetime: f32,
    pub radius: f32,
    /// Health removed from a mission craft on impact
    pub damage: i32,
}

impl ProjectileKind {
    pub const ALL: [ProjectileKind; 9] = [
        ProjectileKind::Standard,
        ProjectileKind::Fast,
        ProjectileKind::Zigzag,
        ProjectileKind::Homing,
        ProjectileKind::Heavy,
        ProjectileKind::Splitting,
        ProjectileKind::Teleporting,
        ProjectileKind::Sniper,
        ProjectileKind::Mirror,
    ];

    pub const fn stats(self) -> KindStats {
        let (speed, turn_rate, max_lifetime, radius, damage) = match self {
            ProjectileKind::Standard => (200.0, 2.0, 8.0, 10.0, 15),
            ProjectileKind::Fast => (320.0, 0.0, 6.0, 8.0, 20),
            ProjectileKind::Zigzag => (220.0, 0.0, 8.0, 10.0, 18),
            ProjectileKind::Homing => (240.0, 0.0, 10.0, 10.0, 25),
            ProjectileKind::Heavy => (140.0, 0.0, 12.0, 16.0, 30),
            ProjectileKind::Splitting => (180.0, 0.0, 12.0, 12.0, 10),
            ProjectileKind::Teleporting => (200.0, 0.0, 12.0, 10.0, 22),
            ProjectileKind::Sniper => (180.0, 0.0, 8.0, 9.0, 35),
            ProjectileKind::Mirror => (200.0, 0.0, 10.0, 10.0, 20),
        };
        KindStats {
            speed,
            turn_rate,
            max_lifetime,
            radius,
            damage,
        }
    }

    #[inline]
    pub const fn damage(self) -> i32 {
        self.stats().damage
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectileKind::Standard => "Standard",
            ProjectileKind::Fast => "Fast",
            ProjectileKind::Zigzag => "Zigzag",
            ProjectileKind::Homing => "Homing",
            ProjectileKind::Heavy => "Heavy",
            ProjectileKind::Splitting => "Splitting",
            ProjectileKind::Teleporting => "Teleporting",
            ProjectileKind::Sniper => "Sniper",
            ProjectileKind::Mirror => "Mirror",
        }
    }
}

/// Per-kind transient steering state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SteerState {
    /// Standard, Fast and Heavy carry no extra state
    Direct,
    Zigzag { phase: f32 },
    Homing { phase: f32 },
    Splitting { split: bool },
    Teleporting { next_teleport_at: f32, last_teleport_at: f32 },
    Sniper { charge: f32, charged: bool },
    Mirror { initialized: bool },
}

impl SteerState {
    fn new(kind: ProjectileKind, rng: &mut SimRng) -> Self {
        match kind {
            ProjectileKind::Standard | ProjectileKind::Fast | ProjectileKind::Heavy => {
                SteerState::Direct
            }
            ProjectileKind::Zigzag => SteerState::Zigzag {
                phase: rng.random_range(0.0..TAU),
            },
            ProjectileKind::Homing => SteerState::Homing {
                phase: rng.random_range(0.0..TAU),
            },
            ProjectileKind::Splitting => SteerState::Splitting { split: false },
            ProjectileKind::Teleporting => SteerState::Teleporting {
                next_teleport_at: rng.random_range(TELEPORT_INTERVAL_MIN..=TELEPORT_INTERVAL_MAX),
                last_teleport_at: 0.0,
            },
            ProjectileKind::Sniper => SteerState::Sniper {
                charge: 0.0,
                charged: false,
            },
            ProjectileKind::Mirror => SteerState::Mirror { initialized: false },
        }
    }
}

/// Why a projectile was marked for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Removal {
    /// Lifetime ran out
    Expired,
    /// Drifted past the playfield margin
    OutOfBounds,
    /// Destroyed by another projectile
    Intercepted,
    /// Struck the craft
    HitCraft,
}

/// What the projectile is chasing this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Notable steering outcomes the tick loop needs to act on
#[derive(Debug, Clone)]
pub enum SteerEvent {
    /// Fragments to add to the arena
    Split(Vec<Projectile>),
    Teleported { from: Vec2, to: Vec2 },
    /// Sniper finished charging and launched at `aim`
    Launched { aim: Vec2 },
}

/// A guided projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub body: Body,
    /// Seconds alive, never decreases
    pub age: f32,
    pub max_lifetime: f32,
    pub speed: f32,
    pub turn_rate: f32,
    pub state: SteerState,
    /// Arcade wave that spawned it (0 in mission mode)
    pub wave: u32,
    /// Spawn lineage; fragments share their parent's so they never collide
    pub family: u32,
    /// Set once; the arena drops it at tick end
    pub removal: Option<Removal>,
    /// Has been on screen at least once; only then can it leave the bounds
    #[serde(default)]
    pub entered: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, pos: Vec2, vel: Vec2, rng: &mut SimRng) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            body: Body::new(pos, vel, stats.radius),
            age: 0.0,
            max_lifetime: stats.max_lifetime,
            speed: stats.speed,
            turn_rate: stats.turn_rate,
            state: SteerState::new(kind, rng),
            wave: 0,
            family: 0,
            removal: None,
            entered: false,
        }
    }

    pub fn with_wave(mut self, wave: u32) -> Self {
        self.wave = wave;
        self
    }

    pub fn with_family(mut self, family: u32) -> Self {
        self.family = family;
        self
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.removal.is_none()
    }

    /// Mark for removal; the first cause wins
    pub fn mark(&mut self, cause: Removal) {
        if self.removal.is_none() {
            self.removal = Some(cause);
        }
    }

    /// Record screen entry, and cull once an entered projectile drifts past
    /// the bounds margin. Launch points sit on the margin itself.
    pub fn check_bounds(&mut self, field: &Playfield) {
        if !self.is_live() {
            return;
        }
        if field.contains(self.body.pos) {
            self.entered = true;
        } else if self.entered && !field.contains_with_margin(self.body.pos) {
            self.mark(Removal::OutOfBounds);
        }
    }

    /// True while a sniper is still aiming
    pub fn is_charging(&self) -> bool {
        matches!(self.state, SteerState::Sniper { charged: false, .. })
    }

    /// Age, steer and move one tick
    ///
    /// A projectile whose age reaches `max_lifetime` is marked `Expired` and
    /// neither steers nor moves again.
    pub fn update(
        &mut self,
        dt: f32,
        target: Target,
        field: &Playfield,
        rng: &mut SimRng,
    ) -> Option<SteerEvent> {
        if !self.is_live() {
            return None;
        }

        self.age += dt;
        if self.age >= self.max_lifetime {
            self.mark(Removal::Expired);
            return None;
        }

        let event = self.steer(dt, target, field, rng);
        self.body.integrate(dt);
        event
    }

    fn steer(
        &mut self,
        dt: f32,
        target: Target,
        field: &Playfield,
        rng: &mut SimRng,
    ) -> Option<SteerEvent> {
        let pos = self.body.pos;
        let desired = direction(pos, target.pos);
        let heading = self.body.vel.heading_or(desired);
        let speed = self.speed;

        match &mut self.state {
            SteerState::Direct => {
                let new_heading = match self.kind {
                    ProjectileKind::Standard => turn_toward(heading, desired, self.turn_rate * dt),
                    ProjectileKind::Fast => blend(heading, desired, 0.3),
                    ProjectileKind::Heavy => blend(heading, desired, 0.8),
                    _ => desired.heading_or(heading),
                };
                self.body.vel = new_heading * speed;
                None
            }

            SteerState::Zigzag { phase } => {
                let offset = (ZIGZAG_FREQUENCY * TAU * self.age + *phase).sin() * ZIGZAG_AMPLITUDE;
                self.body.vel = (desired + desired.perp() * offset).heading_or(heading) * speed;
                None
            }

            SteerState::Homing { phase } => {
                let predicted = target.pos + target.vel * dt;
                let lead = direction(pos, predicted);
                let wobble = (HOMING_WOBBLE_FREQUENCY * TAU * self.age + *phase).sin()
                    * HOMING_WOBBLE_AMPLITUDE;
                self.body.vel = (lead + lead.perp() * wobble).heading_or(heading) * speed;
                None
            }

            SteerState::Splitting { split } => {
                if *split {
                    self.body.vel *= per_tick_decay(SPLIT_DECAY_PER_TICK, dt);
                    return None;
                }
                if self.age > SPLIT_AT_LIFETIME * self.max_lifetime {
                    *split = true;
                    let fragments = fragments(&self.body, heading, self.wave, self.family, rng);
                    self.body.vel *= per_tick_decay(SPLIT_DECAY_PER_TICK, dt);
                    log::debug!("Splitting projectile burst at {:?}", pos);
                    return Some(SteerEvent::Split(fragments));
                }
                self.body.vel = desired.heading_or(heading) * speed;
                None
            }

            SteerState::Teleporting {
                next_teleport_at,
                last_teleport_at,
            } => {
                if self.age + TIMER_EPSILON < *next_teleport_at {
                    self.body.vel = desired.heading_or(heading) * speed;
                    return None;
                }

                let angle = rng.random_range(0.0..TAU);
                let ring = rng.random_range(TELEPORT_RING_MIN..=TELEPORT_RING_MAX);
                let to = field.clamp_inside(target.pos + polar_to_cartesian(ring, angle), self.body.radius);
                let jitter = rng.random_range(-TELEPORT_JITTER..=TELEPORT_JITTER);

                self.body.pos = to;
                self.body.vel = direction(to, target.pos).heading_or(heading).rotated(jitter) * speed;
                *last_teleport_at = self.age;
                *next_teleport_at =
                    self.age + rng.random_range(TELEPORT_INTERVAL_MIN..=TELEPORT_INTERVAL_MAX);
                Some(SteerEvent::Teleported { from: pos, to })
            }

            SteerState::Sniper { charge, charged } => {
                if *charged {
                    return None;
                }
                *charge += dt;
                if *charge + TIMER_EPSILON >= SNIPER_CHARGE_TIME {
                    *charged = true;
                    self.body.vel = desired.heading_or(heading) * speed * SNIPER_LAUNCH_MULTIPLIER;
                    return Some(SteerEvent::Launched { aim: target.pos });
                }
                self.body.vel *= per_tick_decay(SNIPER_DECEL_PER_TICK, dt);
                None
            }

            SteerState::Mirror { initialized } => {
                if !*initialized {
                    *initialized = true;
                    // Reflect the target through ourselves and head there
                    let mirrored = pos * 2.0 - target.pos;
                    self.body.vel = direction(pos, mirrored).heading_or(heading) * speed;
                    return None;
                }
                let away = -target.vel.normalize_or_zero();
                self.body.vel = blend(heading, away, MIRROR_INERTIA) * speed;
                None
            }
        }
    }
}

/// Rotate `heading` toward `desired` by at most `max_step` radians
///
/// The turn direction is the sign of the cross product; the step is clamped
/// so the heading lands exactly on `desired` instead of overshooting.
pub fn turn_toward(heading: Vec2, desired: Vec2, max_step: f32) -> Vec2 {
    if desired == Vec2::ZERO {
        return heading;
    }
    let error = heading.signed_angle_to(desired);
    heading.rotated(error.clamp(-max_step, max_step)).heading_or(heading)
}

/// `normalize(keep·current + (1 - keep)·desired)`, falling back to `current`
pub fn blend(current: Vec2, desired: Vec2, keep: f32) -> Vec2 {
    (current * keep + desired * (1.0 - keep)).heading_or(current)
}

/// Radial burst of Fast fragments, 120° apart around `heading`
fn fragments(parent: &Body, heading: Vec2, wave: u32, family: u32, rng: &mut SimRng) -> Vec<Projectile> {
    let kind = ProjectileKind::Fast;
    let stats = kind.stats();
    let step = TAU / SPLIT_FRAGMENTS as f32;

    (0..SPLIT_FRAGMENTS)
        .map(|i| {
            let dir = heading.rotated(step * i as f32);
            let mut child = Projectile::new(kind, parent.pos, dir * stats.speed, rng)
                .with_wave(wave)
                .with_family(family);
            child.body.radius = stats.radius * FRAGMENT_RADIUS_SCALE;
            child
        })
        .collect()
}
