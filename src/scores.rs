/// Best-score persistence.
///
/// The whole scoreboard is one JSON blob; every save overwrites it (last
/// write wins).  Callers treat failures as non-fatal.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Variant;
use crate::error::StorageError;

const DEFAULT_FILE: &str = ".side_scroller_scores.json";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Platformer(Variant),
    Shooter,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scoreboard {
    pub classic: u32,
    pub checkpoint: u32,
    pub shooter: u32,
}

impl Scoreboard {
    pub fn best(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Platformer(Variant::Classic) => self.classic,
            Mode::Platformer(Variant::Checkpoint) => self.checkpoint,
            Mode::Shooter => self.shooter,
        }
    }

    /// Keep `score` if it beats the stored best.  Returns `true` on a new best.
    pub fn record(&mut self, mode: Mode, score: u32) -> bool {
        let slot = match mode {
            Mode::Platformer(Variant::Classic) => &mut self.classic,
            Mode::Platformer(Variant::Checkpoint) => &mut self.checkpoint,
            Mode::Shooter => &mut self.shooter,
        };
        if score > *slot {
            *slot = score;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ScoreStore { path: path.into() }
    }

    /// `$HOME/.side_scroller_scores.json`, or the working directory when
    /// `HOME` is unset.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(DEFAULT_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty scoreboard, not an error.
    pub fn load(&self) -> Result<Scoreboard, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Scoreboard::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, board: &Scoreboard) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(board)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
