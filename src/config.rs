//! Static game configuration: per-player tuning, spawn points and the
//! sequence pattern tables. Loaded once at startup, immutable afterwards.

use crate::models::player::PlayerTuning;
use crate::models::sequence::{PatternTable, SequencePattern};
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub tuning: PlayerTuning,
    pub spawn: (f32, f32),
    pub patterns: Vec<SequencePattern>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tuning: PlayerTuning::default(),
            spawn: (0.0, 0.0),
            patterns: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player_one: PlayerConfig,
    pub player_two: PlayerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        let pattern = |name: &str, notes: [u8; 4], unlock_key: Option<&str>| SequencePattern {
            name: name.to_string(),
            notes,
            unlock_key: unlock_key.map(str::to_string),
        };

        // Each table holds the melodies that player performs; the named
        // effect lands on the partner. The Box melody belongs to player two
        // because only a boxed player one can hold buttons down.
        Self {
            player_one: PlayerConfig {
                tuning: PlayerTuning::default(),
                spawn: (-2.0, 0.0),
                patterns: vec![
                    pattern("Jump", [0, 1, 2, 3], None),
                    pattern("Flatten", [1, 0, 2, 3], None),
                    pattern("Gravity", [3, 3, 1, 0], Some("Effect1Unlocked")),
                ],
            },
            player_two: PlayerConfig {
                tuning: PlayerTuning::default(),
                spawn: (2.0, 0.0),
                patterns: vec![
                    pattern("Jump", [0, 1, 2, 3], None),
                    pattern("Box", [2, 2, 0, 0], None),
                    pattern("Gravity", [3, 3, 1, 0], Some("Effect1Unlocked")),
                ],
            },
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {:?}: {}", path, e))?;
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config {:?}: {}", path, e))
    }

    /// Loads from disk if present, otherwise the built-in defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match Self::load(path) {
                Ok(config) => return config,
                Err(e) => log::warn!("CONFIG: {}, using defaults", e),
            }
        }
        Self::default()
    }

    pub fn table_for_one(&self) -> PatternTable {
        PatternTable::new(self.player_one.patterns.clone())
    }

    pub fn table_for_two(&self) -> PatternTable {
        PatternTable::new(self.player_two.patterns.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_config() {
        let raw = r#"
            [player_one]
            spawn = [-3.0, 1.0]

            [player_one.tuning]
            move_speed = 6.5
            jump_force = 12.0

            [[player_one.patterns]]
            name = "Jump"
            notes = [0, 1, 2, 3]

            [[player_one.patterns]]
            name = "Gravity"
            notes = [3, 3, 1, 0]
            unlock_key = "Effect1Unlocked"
        "#;

        let config: GameConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.player_one.tuning.move_speed, 6.5);
        assert_eq!(config.player_one.tuning.sequence_timeout, 2.0); // default
        assert_eq!(config.player_one.spawn, (-3.0, 1.0));
        assert_eq!(config.player_one.patterns.len(), 2);
        assert_eq!(
            config.player_one.patterns[1].unlock_key.as_deref(),
            Some("Effect1Unlocked")
        );

        // Untouched player falls back entirely to defaults.
        assert_eq!(config.player_two.tuning.move_speed, 5.0);
    }

    #[test]
    fn test_default_tables_are_nonempty() {
        let config = GameConfig::default();
        assert!(!config.table_for_one().patterns.is_empty());
        assert!(!config.table_for_two().patterns.is_empty());
    }
}
