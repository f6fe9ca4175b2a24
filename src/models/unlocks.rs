//! Persisted string-keyed unlock flags.
//!
//! Backed by a small JSON file so flags survive process restarts. A missing
//! or unreadable file just means a fresh store; save failures are logged and
//! the game carries on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const MUSIC_MODE_P1: &str = "MusicModeUnlocked";
pub const MUSIC_MODE_P2: &str = "MusicModeUnlocked2";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Flags {
    flags: HashMap<String, bool>,
}

#[derive(Clone, Debug)]
pub struct UnlockStore {
    flags: Flags,
    path: Option<PathBuf>,
}

impl UnlockStore {
    /// Loads from disk, falling back to an empty store on first run.
    pub fn load(path: PathBuf) -> Self {
        let flags = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(flags) => flags,
                Err(e) => {
                    log::warn!("UNLOCKS: {} is corrupt ({}), starting fresh", path.display(), e);
                    Flags::default()
                }
            },
            Err(_) => Flags::default(),
        };
        Self { flags, path: Some(path) }
    }

    /// Non-persisted store for tests and headless runs.
    pub fn in_memory() -> Self {
        Self {
            flags: Flags::default(),
            path: None,
        }
    }

    pub fn is_unlocked(&self, key: &str) -> bool {
        self.flags.flags.get(key).copied().unwrap_or(false)
    }

    pub fn unlock(&mut self, key: &str) {
        self.flags.flags.insert(key.to_string(), true);
        self.save();
    }

    /// Full game restart wipes everything.
    pub fn reset_all(&mut self) {
        self.flags.flags.clear();
        self.save();
    }

    fn save(&self) {
        let Some(path) = &self.path else { return };
        let raw = match serde_json::to_string_pretty(&self.flags) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("UNLOCKS: serialize failed: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(path, raw) {
            log::error!("UNLOCKS: write {} failed: {}", path.display(), e);
        }
    }
}
