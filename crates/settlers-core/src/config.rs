//! Match configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Victory points needed to win under the standard rules
pub const DEFAULT_VICTORY_POINTS_TO_WIN: u32 = 10;

/// Environment variable overriding the win threshold
pub const VICTORY_POINTS_ENV: &str = "SETTLERS_VICTORY_POINTS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Victory point threshold must be at least 1")]
    InvalidThreshold,

    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Rules that vary between matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Score at which the Play phase hands over to End
    pub victory_points_to_win: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            victory_points_to_win: DEFAULT_VICTORY_POINTS_TO_WIN,
        }
    }
}

impl GameConfig {
    pub fn with_victory_points(victory_points_to_win: u32) -> Result<Self, ConfigError> {
        Self {
            victory_points_to_win,
        }
        .validated()
    }

    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Defaults, overridden by `SETTLERS_VICTORY_POINTS` when set
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(VICTORY_POINTS_ENV) {
            Ok(value) => Self::from_env_value(&value),
            Err(_) => Ok(Self::default()),
        }
    }

    fn from_env_value(value: &str) -> Result<Self, ConfigError> {
        let victory_points_to_win = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: VICTORY_POINTS_ENV,
            value: value.to_string(),
        })?;
        Self::with_victory_points(victory_points_to_win)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.victory_points_to_win == 0 {
            return Err(ConfigError::InvalidThreshold);
        }
        Ok(self)
    }
}
