use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::constants::*;
use crate::logging::TracingConfig;
use crate::world::ZoneId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for a headless simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world_seed: u64,
    pub max_frame_dt: f32,
    pub particle_cap: usize,
    pub combo_window: f32,
    pub starting_zone: ZoneId,
    pub starting_gold: u32,
    pub mana_regen_per_sec: f32,
    pub town_regen_per_sec: f32,
    pub zone_respawn_delay: f32,
    pub tracing: TracingConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_seed: 42,
            max_frame_dt: MAX_FRAME_DT,
            particle_cap: MAX_PARTICLES,
            combo_window: COMBO_WINDOW_SECS,
            starting_zone: ZoneId::Town,
            starting_gold: STARTING_GOLD,
            mana_regen_per_sec: MANA_REGEN_PER_SEC,
            town_regen_per_sec: TOWN_REGEN_PER_SEC,
            zone_respawn_delay: ZONE_RESPAWN_DELAY,
            tracing: TracingConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load by extension: `.json` is JSON, anything else is RON
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("ron") => Self::from_ron_str(&text),
            other => {
                warn!(path = %path.display(), extension = ?other, "Unknown config extension, parsing as RON");
                Self::from_ron_str(&text)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0) {
            return Err(ConfigError::Invalid {
                field: "max_frame_dt",
                reason: format!("must be positive, got {}", self.max_frame_dt),
            });
        }
        if self.particle_cap == 0 {
            return Err(ConfigError::Invalid {
                field: "particle_cap",
                reason: "must be at least 1".into(),
            });
        }
        if !(self.combo_window.is_finite() && self.combo_window > 0.0) {
            return Err(ConfigError::Invalid {
                field: "combo_window",
                reason: format!("must be positive, got {}", self.combo_window),
            });
        }
        for (field, value) in [
            ("mana_regen_per_sec", self.mana_regen_per_sec),
            ("town_regen_per_sec", self.town_regen_per_sec),
            ("zone_respawn_delay", self.zone_respawn_delay),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                });
            }
        }
        if self.starting_zone == ZoneId::Dungeon {
            return Err(ConfigError::Invalid {
                field: "starting_zone",
                reason: "a run cannot start inside a dungeon".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_cap, 700);
        assert!((config.combo_window - 2.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ron_partial_override() {
        let config = SimConfig::from_ron_str("(world_seed: 7, starting_zone: meadow)").unwrap();
        assert_eq!(config.world_seed, 7);
        assert_eq!(config.starting_zone, ZoneId::Meadow);
        assert_eq!(config.starting_gold, 40);
    }

    #[test]
    fn test_json_with_tracing() {
        let config = SimConfig::from_json_str(
            r#"{ "particle_cap": 120, "tracing": { "default_level": "debug" } }"#,
        )
        .unwrap();
        assert_eq!(config.particle_cap, 120);
        assert_eq!(config.tracing.default_level, LogLevel::Debug);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = SimConfig::from_json_str(r#"{ "max_frame_dt": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_frame_dt", .. }));

        let err = SimConfig::from_ron_str("(particle_cap: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "particle_cap", .. }));

        let err = SimConfig::from_json_str(r#"{ "starting_zone": "dungeon" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "starting_zone", .. }));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(SimConfig::from_json_str("{"), Err(ConfigError::Json(_))));
        assert!(matches!(SimConfig::from_ron_str("(world_seed: )"), Err(ConfigError::Ron(_))));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let ron_path = dir.path().join("sim.ron");
        let mut file = std::fs::File::create(&ron_path).unwrap();
        writeln!(file, "(world_seed: 99)").unwrap();
        assert_eq!(SimConfig::load(&ron_path).unwrap().world_seed, 99);

        let json_path = dir.path().join("sim.json");
        std::fs::write(&json_path, r#"{ "world_seed": 5 }"#).unwrap();
        assert_eq!(SimConfig::load(&json_path).unwrap().world_seed, 5);

        let missing = dir.path().join("missing.ron");
        assert!(matches!(SimConfig::load(&missing), Err(ConfigError::Io(_))));
    }
}
