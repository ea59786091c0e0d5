//! Save data persistence
//!
//! Tracks the best score and the lifetime star count across runs. Saving is
//! fire-and-forget: a failed write is logged and the run carries on.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Receives the final counters once per run
pub trait Persistence {
    fn save_state(&mut self, score: u64, stars: u32);
}

/// Data kept between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Best score of any run
    pub high_score: u64,
    /// Stars collected over all runs
    pub stars: u64,
    /// Runs recorded
    #[serde(default)]
    pub runs: u32,
}

impl SaveData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished run in. Returns true if it set a new high score.
    pub fn record_run(&mut self, score: u64, stars: u32) -> bool {
        self.stars += u64::from(stars);
        self.runs += 1;
        if score > self.high_score {
            self.high_score = score;
            return true;
        }
        false
    }
}

impl Persistence for SaveData {
    fn save_state(&mut self, score: u64, stars: u32) {
        self.record_run(score, stars);
    }
}

/// Save data backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    data: SaveData,
}

impl JsonFileStore {
    /// Open the store, starting fresh if the file is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<SaveData>(&json) {
                Ok(data) => {
                    log::info!("Loaded save data (high score {})", data.high_score);
                    data
                }
                Err(e) => {
                    log::warn!("Save data {} is corrupt, starting fresh: {}", path.display(), e);
                    SaveData::new()
                }
            },
            Err(_) => {
                log::info!("No save data found, starting fresh");
                SaveData::new()
            }
        };
        Self { path, data }
    }

    pub fn data(&self) -> &SaveData {
        &self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current data to disk
    pub fn flush(&self) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.data).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)
    }
}

impl Persistence for JsonFileStore {
    fn save_state(&mut self, score: u64, stars: u32) {
        if self.data.record_run(score, stars) {
            log::info!("New high score: {}", score);
        }
        match self.flush() {
            Ok(()) => log::info!("Save data written to {}", self.path.display()),
            Err(e) => log::warn!("Failed to write save data {}: {}", self.path.display(), e),
        }
    }
}
