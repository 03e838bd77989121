//! Simulation loop and screen state machine
//!
//! Menu ⇄ Instructions, Menu → Running → (Paused ⇄ Running) → Terminal → Menu.
//! Only `Running` advances the simulation; the host keeps calling `update`
//! and `snapshot` every frame regardless of phase.

use glam::Vec2;

use crate::error::{ConfigError, TransitionError};
use crate::highscores::{HighScoreEntry, HighScores, ScoreStore};
use crate::settings::SimConfig;
use crate::sim::{Craft, GameEvent, Mode, Outcome, RunState, RunStats, Snapshot, WorldPartition, tick};

/// Stats handed over when a mission route is completed
pub type TraversalStats = RunStats;

/// Current screen / run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Instructions,
    Running,
    Paused,
    Terminal(Outcome),
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Menu => "in menu",
            Phase::Instructions => "showing instructions",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Terminal(_) => "finished",
        }
    }
}

/// Results/presentation layer hooks
pub trait RunObserver {
    fn on_craft_destroyed(&mut self, score: u64);
    fn on_world_traversal_complete(&mut self, stats: &TraversalStats);
    /// Every simulation event, for sound and effects
    fn on_event(&mut self, _event: &GameEvent) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn on_craft_destroyed(&mut self, _score: u64) {}
    fn on_world_traversal_complete(&mut self, _stats: &TraversalStats) {}
}

/// Owns the active run and drives it from the host's frame callback
pub struct SimulationLoop {
    config: SimConfig,
    world_template: WorldPartition,
    phase: Phase,
    run: Option<RunState>,
    runs_started: u64,
    scores: HighScores,
    store: Box<dyn ScoreStore>,
    observer: Box<dyn RunObserver>,
}

impl SimulationLoop {
    /// Validate the config and load the leaderboard
    pub fn new(
        config: SimConfig,
        mut store: Box<dyn ScoreStore>,
        observer: Box<dyn RunObserver>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let world_template = config.build_world()?;
        let scores = store.load();
        Ok(Self {
            config,
            world_template,
            phase: Phase::Menu,
            run: None,
            runs_started: 0,
            scores,
            store,
            observer,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn best_score(&self, mode: Mode) -> Option<u64> {
        self.scores.top_score(mode)
    }

    fn reject(&self, action: &'static str) -> TransitionError {
        let err = TransitionError {
            action,
            phase: self.phase.as_str(),
        };
        log::warn!("{}", err);
        err
    }

    pub fn show_instructions(&mut self) -> Result<(), TransitionError> {
        if self.phase != Phase::Menu {
            return Err(self.reject("show instructions"));
        }
        self.phase = Phase::Instructions;
        Ok(())
    }

    /// Leave instructions or a finished run; the run is discarded
    pub fn back_to_menu(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            Phase::Instructions | Phase::Terminal(_) => {
                self.run = None;
                self.phase = Phase::Menu;
                Ok(())
            }
            _ => Err(self.reject("return to menu")),
        }
    }

    /// Begin a new run from the menu
    pub fn start(&mut self, mode: Mode) -> Result<(), TransitionError> {
        if self.phase != Phase::Menu {
            return Err(self.reject("start a run"));
        }
        let seed = self
            .config
            .seed
            .wrapping_add(self.runs_started.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.runs_started += 1;

        let run = match mode {
            Mode::Arcade => RunState::arcade(&self.config, seed),
            Mode::Mission => RunState::mission(&self.config, self.world_template.clone(), seed),
        };
        let run = match run {
            Ok(run) => run,
            Err(e) => {
                log::error!("Cannot build {} run: {}", mode.as_str(), e);
                return Err(self.reject("start a run"));
            }
        };
        self.run = Some(run);
        self.phase = Phase::Running;
        // Announce the opening wave / segment
        self.dispatch_events();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TransitionError> {
        if self.phase != Phase::Running {
            return Err(self.reject("pause"));
        }
        self.phase = Phase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TransitionError> {
        if self.phase != Phase::Paused {
            return Err(self.reject("resume"));
        }
        self.phase = Phase::Running;
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            _ => Err(self.reject("toggle pause")),
        }
    }

    /// Arcade input: where the craft should fly
    pub fn set_target_position(&mut self, target: Vec2) {
        if self.phase != Phase::Running {
            return;
        }
        if let Some(Craft::Arcade(craft)) = self.run.as_mut().map(|r| &mut r.craft) {
            craft.set_target(target);
        }
    }

    /// Mission input: held direction, each axis in {-1, 0, 1}
    pub fn set_directional_input(&mut self, x: f32, y: f32) {
        if self.phase != Phase::Running {
            return;
        }
        if let Some(Craft::Mission(craft)) = self.run.as_mut().map(|r| &mut r.craft) {
            craft.set_input(x, y);
        }
    }

    /// Per-frame entry point; `dt` is wall-clock seconds since the last call,
    /// clamped by the tick to the configured `max_dt`
    pub fn update(&mut self, dt: f32) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };
        tick(run, dt);
        self.dispatch_events();

        if let Some(outcome) = self.run.as_ref().and_then(|r| r.outcome) {
            self.finish(outcome);
        }
    }

    /// Render feed for the current run (kept through pause and results)
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.run.as_ref().map(RunState::snapshot)
    }

    fn dispatch_events(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        for event in run.drain_events() {
            self.observer.on_event(&event);
            match &event {
                GameEvent::CraftDestroyed { score } => self.observer.on_craft_destroyed(*score),
                GameEvent::TraversalComplete(stats) => {
                    self.observer.on_world_traversal_complete(stats)
                }
                _ => {}
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.phase = Phase::Terminal(outcome);
        let Some(run) = self.run.as_ref() else {
            return;
        };

        let reached = match run.wave_index() {
            Some(wave) => wave,
            None => run.world().map(|w| w.segment_index() as u32 + 1).unwrap_or(0),
        };
        let entry = HighScoreEntry {
            score: run.score,
            reached,
            elapsed: run.elapsed,
            completed: outcome == Outcome::Success,
        };
        log::info!(
            "{} run ended ({:?}) with score {}",
            run.mode.as_str(),
            outcome,
            run.score
        );
        if let Some(rank) = self.scores.add_score(run.mode, entry) {
            log::info!("New high score, rank {}", rank);
            self.store.save(&self.scores);
        }
    }
}
