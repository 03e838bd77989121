//! Combo streak with timeout decay

use serde::{Deserialize, Serialize};

use crate::consts::{COMBO_MAX_MULTIPLIER, COMBO_TIMEOUT};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboTracker {
    pub streak: u32,
    pub multiplier: f32,
    /// Simulation time of the last qualifying event
    pub last_event_time: f32,
}

impl Default for ComboTracker {
    fn default() -> Self {
        Self {
            streak: 0,
            multiplier: 1.0,
            last_event_time: 0.0,
        }
    }
}

impl ComboTracker {
    /// Count a qualifying event at simulation time `now`; returns the new streak
    pub fn register(&mut self, now: f32) -> u32 {
        self.streak += 1;
        self.multiplier = (1.0 + self.streak as f32 / 10.0).min(COMBO_MAX_MULTIPLIER);
        self.last_event_time = now;
        self.streak
    }

    /// Drop the streak once `COMBO_TIMEOUT` passes without an event
    pub fn update(&mut self, now: f32) {
        if self.streak > 0 && now - self.last_event_time >= COMBO_TIMEOUT {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.streak = 0;
        self.multiplier = 1.0;
    }
}
