//! Tunable rules for a game.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// What happens to the combo multiplier after a move that changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComboPolicy {
    /// A no-op move leaves the combo alone.
    #[default]
    Keep,
    /// A no-op move resets the combo to 1.
    Reset,
}

/// Probabilities used when spawning a tile.
///
/// The special bands are laid out on one uniform draw in a fixed order:
/// `[0, wildcard)` is a wildcard, `[wildcard, wildcard + converter)` is a
/// converter, anything above is a normal tile.
#[derive(Debug, Clone, Copy, PartialEq, Getters, Serialize, Deserialize)]
pub struct SpawnWeights {
    /// Chance that a spawned tile is a 4 rather than a 2.
    #[serde(default = "default_four_chance")]
    four_chance: f64,

    /// Width of the wildcard band.
    #[serde(default = "default_wildcard_chance")]
    wildcard_chance: f64,

    /// Width of the converter band.
    #[serde(default = "default_converter_chance")]
    converter_chance: f64,
}

fn default_four_chance() -> f64 {
    0.1
}

fn default_wildcard_chance() -> f64 {
    0.03
}

fn default_converter_chance() -> f64 {
    0.08
}

impl SpawnWeights {
    /// Creates spawn weights.
    pub fn new(four_chance: f64, wildcard_chance: f64, converter_chance: f64) -> Self {
        Self {
            four_chance,
            wildcard_chance,
            converter_chance,
        }
    }

    /// Weights that never produce specials or fours.
    pub fn plain() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self::new(
            default_four_chance(),
            default_wildcard_chance(),
            default_converter_chance(),
        )
    }
}

/// Rules configuration for one game.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Side length of the square grid.
    #[serde(default = "default_grid_size")]
    grid_size: usize,

    /// Tiles spawned when a game starts.
    #[serde(default = "default_initial_tiles")]
    initial_tiles: usize,

    /// Recolor uses available per game.
    #[serde(default = "default_color_change_moves")]
    color_change_moves: u32,

    /// Spawn probabilities.
    #[serde(default)]
    spawn: SpawnWeights,

    /// Combo handling for moves that changed nothing.
    #[serde(default)]
    idle_combo: ComboPolicy,
}

fn default_grid_size() -> usize {
    6
}

fn default_initial_tiles() -> usize {
    2
}

fn default_color_change_moves() -> u32 {
    5
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            initial_tiles: default_initial_tiles(),
            color_change_moves: default_color_change_moves(),
            spawn: SpawnWeights::default(),
            idle_combo: ComboPolicy::default(),
        }
    }
}

impl RulesConfig {
    /// Default rules on a grid of the given size.
    #[instrument]
    pub fn with_grid_size(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Self::default()
        }
    }

    /// Replaces the spawn weights.
    pub fn with_spawn(mut self, spawn: SpawnWeights) -> Self {
        self.spawn = spawn;
        self
    }

    /// Replaces the number of starting tiles.
    pub fn with_initial_tiles(mut self, initial_tiles: usize) -> Self {
        self.initial_tiles = initial_tiles;
        self
    }

    /// Replaces the recolor budget.
    pub fn with_color_change_moves(mut self, moves: u32) -> Self {
        self.color_change_moves = moves;
        self
    }

    /// Replaces the idle combo policy.
    pub fn with_idle_combo(mut self, policy: ComboPolicy) -> Self {
        self.idle_combo = policy;
        self
    }

    /// Loads configuration from a TOML file and validates it.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading rules from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read rules file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(grid_size = config.grid_size, "Rules loaded");
        Ok(config)
    }

    /// Parses configuration from TOML text and validates it.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse rules: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the rules describe a playable game.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::new(format!(
                "grid_size must be at least 2, got {}",
                self.grid_size
            )));
        }
        if self.initial_tiles == 0 {
            return Err(ConfigError::new(
                "initial_tiles must be at least 1".to_string(),
            ));
        }
        if self.initial_tiles > self.grid_size * self.grid_size {
            return Err(ConfigError::new(format!(
                "initial_tiles {} exceeds {} cells",
                self.initial_tiles,
                self.grid_size * self.grid_size
            )));
        }
        let probabilities = [
            ("four_chance", self.spawn.four_chance),
            ("wildcard_chance", self.spawn.wildcard_chance),
            ("converter_chance", self.spawn.converter_chance),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::new(format!("{} must be in [0, 1], got {}", name, p)));
            }
        }
        if self.spawn.wildcard_chance + self.spawn.converter_chance > 1.0 {
            return Err(ConfigError::new(
                "wildcard_chance + converter_chance exceeds 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_canonical_ruleset() {
        let config = RulesConfig::default();
        assert_eq!(*config.grid_size(), 6);
        assert_eq!(*config.color_change_moves(), 5);
        assert_eq!(*config.spawn().wildcard_chance(), 0.03);
        assert_eq!(*config.spawn().converter_chance(), 0.08);
        assert_eq!(*config.idle_combo(), ComboPolicy::Keep);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = RulesConfig::from_toml("grid_size = 4\n[spawn]\nfour_chance = 0.5\n").unwrap();
        assert_eq!(*config.grid_size(), 4);
        assert_eq!(*config.spawn().four_chance(), 0.5);
        assert_eq!(*config.spawn().wildcard_chance(), 0.03);
        assert_eq!(*config.initial_tiles(), 2);
    }

    #[test]
    fn test_idle_combo_parses() {
        let config = RulesConfig::from_toml("idle_combo = \"reset\"\n").unwrap();
        assert_eq!(*config.idle_combo(), ComboPolicy::Reset);
    }

    #[test]
    fn test_rejects_tiny_grid() {
        let err = RulesConfig::from_toml("grid_size = 1\n").unwrap_err();
        assert!(err.message.contains("grid_size"));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = RulesConfig::from_toml("[spawn]\nwildcard_chance = 1.5\n").unwrap_err();
        assert!(err.message.contains("wildcard_chance"));
    }

    #[test]
    fn test_rejects_overlapping_special_bands() {
        let err = RulesConfig::from_toml("[spawn]\nwildcard_chance = 0.6\nconverter_chance = 0.6\n")
            .unwrap_err();
        assert!(err.message.contains("exceeds 1"));
    }

    #[test]
    fn test_rejects_empty_start() {
        let err = RulesConfig::from_toml("initial_tiles = 0\n").unwrap_err();
        assert!(err.message.contains("initial_tiles"));
        assert!(RulesConfig::with_grid_size(4).with_initial_tiles(0).validate().is_err());
    }

    #[test]
    fn test_flip_values_are_not_configurable() {
        assert!(RulesConfig::from_toml("color_flip_values = []\n").is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(RulesConfig::from_toml("grid_size = [").is_err());
    }
}
