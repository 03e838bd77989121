//! Missile Dodge entry point
//!
//! Headless demo: flies one arcade and one mission run at a fixed 60 Hz with a
//! simple evasive autopilot and logs the results.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use missile_dodge::consts::*;
    use missile_dodge::controller::{Phase, RunObserver, SimulationLoop, TraversalStats};
    use missile_dodge::highscores::MemoryScoreStore;
    use missile_dodge::settings::SimConfig;
    use missile_dodge::sim::{GameEvent, Mode, Snapshot};

    /// Simulated seconds before a demo run is abandoned
    const RUN_LIMIT: f32 = 600.0;
    /// Projectiles farther than this are ignored by the autopilot
    const THREAT_RANGE: f32 = 300.0;

    struct LogObserver;

    impl RunObserver for LogObserver {
        fn on_craft_destroyed(&mut self, score: u64) {
            log::info!("Craft destroyed, final score {}", score);
        }

        fn on_world_traversal_complete(&mut self, stats: &TraversalStats) {
            log::info!(
                "Traversal complete: {} points, {:.1} km, {} kills in {:.1}s",
                stats.score,
                stats.distance_km,
                stats.kills,
                stats.elapsed
            );
        }

        fn on_event(&mut self, event: &GameEvent) {
            match event {
                GameEvent::WaveStarted { wave } => log::info!("Wave {}", wave),
                GameEvent::SegmentEntered { name, .. } => log::info!("Now over {}", name),
                GameEvent::ComboBonus { streak, points } => {
                    log::info!("Evasion streak {} (+{})", streak, points)
                }
                GameEvent::CraftHit {
                    kind,
                    health: Some(health),
                    ..
                } => log::info!("Hit by {} missile, health {}", kind.as_str(), health),
                _ => {}
            }
        }
    }

    /// Sum of pushes away from nearby projectiles, weighted by closeness
    fn escape_vector(snap: &Snapshot) -> Vec2 {
        let craft = snap.craft.pos;
        snap.projectiles
            .iter()
            .filter_map(|p| {
                let away = craft - p.pos;
                let dist = away.length();
                (dist > 0.0 && dist < THREAT_RANGE)
                    .then(|| away / dist * (1.0 - dist / THREAT_RANGE))
            })
            .sum()
    }

    fn steer(sim: &mut SimulationLoop, snap: &Snapshot) {
        let escape = escape_vector(snap);
        let width = sim.config().playfield_width;
        let height = sim.config().playfield_height;
        let home = match snap.mode {
            Mode::Arcade => Vec2::new(width * 0.5, height * 0.5),
            Mode::Mission => Vec2::new(width * 0.5, height * 0.8),
        };
        // Drift back toward home when nothing is close
        let drift = (home - snap.craft.pos) * 0.002;
        let heading = escape + drift;

        match snap.mode {
            Mode::Arcade => sim.set_target_position(snap.craft.pos + heading * 200.0),
            Mode::Mission => {
                let axis = |v: f32| if v.abs() < 0.1 { 0.0 } else { v.signum() };
                sim.set_directional_input(axis(heading.x), axis(heading.y));
            }
        }
    }

    fn fly(sim: &mut SimulationLoop, mode: Mode) {
        if let Err(e) = sim.start(mode) {
            log::error!("{}", e);
            return;
        }
        let dt = 1.0 / REFERENCE_HZ;
        let mut elapsed = 0.0;
        while sim.phase() == Phase::Running && elapsed < RUN_LIMIT {
            if let Some(snap) = sim.snapshot() {
                steer(sim, &snap);
            }
            sim.update(dt);
            elapsed += dt;
        }

        if let Some(snap) = sim.snapshot() {
            let reached = match (snap.wave, &snap.segment) {
                (Some(wave), _) => format!("wave {}", wave),
                (None, Some(seg)) => format!("{} ({:.1} km)", seg.name, seg.distance_km),
                (None, None) => String::new(),
            };
            log::info!(
                "{} run: {:?}, score {}, reached {}, {:.1}s",
                mode.as_str(),
                snap.outcome,
                snap.score,
                reached,
                snap.elapsed
            );
        }
        if sim.phase() == Phase::Running {
            log::warn!("{} run abandoned after {}s", mode.as_str(), RUN_LIMIT);
        }
    }

    pub fn run() {
        for mode in [Mode::Arcade, Mode::Mission] {
            let mut sim = match SimulationLoop::new(
                SimConfig::default(),
                Box::new(MemoryScoreStore::new()),
                Box::new(LogObserver),
            ) {
                Ok(sim) => sim,
                Err(e) => {
                    log::error!("Invalid configuration: {}", e);
                    return;
                }
            };

            fly(&mut sim, mode);
            match sim.best_score(mode) {
                Some(score) => log::info!("Best {} score: {}", mode.as_str(), score),
                None => log::info!("No {} score recorded", mode.as_str()),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Missile Dodge (headless) starting...");
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
