//! High score leaderboard system
//!
//! Persisted as JSON, tracks the top 10 scores. The simulation only ever
//! needs `top_score()`; the host feeds every finished run in through
//! `record` and saves when the run placed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::GameEvent;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Wave reached (1-based)
    pub wave: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, wave: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            wave,
            timestamp,
        };

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Record a finished run from its `GameOver` event; other events are ignored.
    /// Returns the rank achieved, if any.
    pub fn record(&mut self, event: &GameEvent, timestamp: f64) -> Option<usize> {
        match *event {
            GameEvent::GameOver { score, wave } => self.add_score(score, wave + 1, timestamp),
            _ => None,
        }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from a JSON file; a missing file is an empty board
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No high scores found, starting fresh");
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let scores: HighScores = serde_json::from_str(&json)?;
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    /// Save high scores as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
