//! High score leaderboard system
//!
//! Tracks the top 10 runs per mode. Storage is a capability handed to the
//! controller; the simulation never touches it directly.

use serde::{Deserialize, Serialize};

use crate::sim::Mode;

/// Maximum number of high scores to keep per mode
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Arcade wave or mission segment reached (1-based)
    pub reached: u32,
    /// Simulated seconds survived
    pub elapsed: f32,
    /// Mission completed
    #[serde(default)]
    pub completed: bool,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    #[serde(default)]
    pub arcade: Vec<HighScoreEntry>,
    #[serde(default)]
    pub mission: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, mode: Mode) -> &[HighScoreEntry] {
        match mode {
            Mode::Arcade => &self.arcade,
            Mode::Mission => &self.mission,
        }
    }

    fn entries_mut(&mut self, mode: Mode) -> &mut Vec<HighScoreEntry> {
        match mode {
            Mode::Arcade => &mut self.arcade,
            Mode::Mission => &mut self.mission,
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, mode: Mode, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let entries = self.entries(mode);
        if entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, mode: Mode, score: u64) -> Option<usize> {
        if !self.qualifies(mode, score) {
            return None;
        }
        let entries = self.entries(mode);
        let rank = entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(entries.len()) + 1)
    }

    /// Add a new run to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, mode: Mode, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(mode, entry.score) {
            return None;
        }

        let entries = self.entries_mut(mode);
        // Sorted descending by score; ties keep the older run first
        let pos = entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                entries.insert(i, entry);
                i + 1
            }
            None => {
                entries.push(entry);
                entries.len()
            }
        };

        entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.arcade.is_empty() && self.mission.is_empty()
    }

    /// Get the top score for a mode (if any)
    pub fn top_score(&self, mode: Mode) -> Option<u64> {
        self.entries(mode).first().map(|e| e.score)
    }
}

/// Where the leaderboard lives between sessions
pub trait ScoreStore {
    fn load(&mut self) -> HighScores;
    fn save(&mut self, scores: &HighScores);
}

/// Keeps the leaderboard as a JSON string, the way a key-value store would
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    json: Option<String>,
    pub saves: usize,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with previously saved JSON
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
            saves: 0,
        }
    }

    pub fn json(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&mut self) -> HighScores {
        if let Some(json) = &self.json {
            match serde_json::from_str::<HighScores>(json) {
                Ok(scores) => {
                    log::info!(
                        "Loaded {} arcade / {} mission high scores",
                        scores.arcade.len(),
                        scores.mission.len()
                    );
                    return scores;
                }
                Err(e) => log::warn!("Discarding unreadable high scores: {}", e),
            }
        }

        log::info!("No high scores found, starting fresh");
        HighScores::new()
    }

    fn save(&mut self, scores: &HighScores) {
        match serde_json::to_string(scores) {
            Ok(json) => {
                self.json = Some(json);
                self.saves += 1;
                log::info!("High scores saved");
            }
            Err(e) => log::warn!("Failed to serialize high scores: {}", e),
        }
    }
}
