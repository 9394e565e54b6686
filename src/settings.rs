//! Meta-progress settings
//!
//! Unlock flags carried between sessions. Storage lives with the host; the simulation only
//! reads these when a session starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::HEAL_CHARGES;

/// Errors produced while reading persisted settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unlocked level {0} is outside 1..=4")]
    LevelOutOfRange(u32),
}

/// Persisted unlock state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Healing flask bought in the shop
    #[serde(default)]
    pub heal_unlocked: bool,
    /// Bone item bought in the shop (enables infinite heals once level 4 is reached)
    #[serde(default)]
    pub bone_unlocked: bool,
    /// Highest level the player may start
    #[serde(default = "default_unlocked_level")]
    pub unlocked_level: u32,
}

fn default_unlocked_level() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            heal_unlocked: false,
            bone_unlocked: false,
            unlocked_level: default_unlocked_level(),
        }
    }
}

impl Settings {
    /// Heals stop consuming charges
    pub fn infinite_heal(&self) -> bool {
        self.bone_unlocked && self.unlocked_level >= 4
    }

    /// Charges granted at session start
    pub fn starting_heal_charges(&self) -> u32 {
        if self.heal_unlocked { HEAL_CHARGES } else { 0 }
    }

    /// Record a cleared level, unlocking the next one (capped at 4)
    pub fn record_victory(&mut self, level: u32) {
        if level == self.unlocked_level && level < 4 {
            self.unlocked_level += 1;
            log::info!("Unlocked level {}", self.unlocked_level);
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        if !(1..=4).contains(&settings.unlocked_level) {
            return Err(ConfigError::LevelOutOfRange(settings.unlocked_level));
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.starting_heal_charges(), 0);
    }

    #[test]
    fn test_infinite_heal_needs_bone_and_level_four() {
        let mut settings = Settings {
            heal_unlocked: true,
            bone_unlocked: true,
            unlocked_level: 3,
        };
        assert!(!settings.infinite_heal());
        settings.record_victory(3);
        assert_eq!(settings.unlocked_level, 4);
        assert!(settings.infinite_heal());
        // Level 4 is the cap
        settings.record_victory(4);
        assert_eq!(settings.unlocked_level, 4);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            Settings::from_json("{\"unlocked_level\": 9}"),
            Err(ConfigError::LevelOutOfRange(9))
        ));
        assert!(matches!(Settings::from_json("not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            heal_unlocked: true,
            bone_unlocked: false,
            unlocked_level: 2,
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
