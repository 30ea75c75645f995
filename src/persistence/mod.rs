//! Save blobs.
//!
//! - Each stateful component implements [`Persistent`] and round trips
//!   through a plain JSON value
//! - Hydration never fails: missing fields keep defaults, wrong shapes are
//!   logged and replaced by defaults
//! - The outer [`SaveGame`] carries a `version`. A missing version reads as
//!   the current one; unknown future versions are rejected instead of
//!   half-loaded

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::world::ZoneId;

/// Current save format version
pub const CURRENT_SAVE_VERSION: u32 = 1;

/// A component that can be saved to and restored from a JSON value
pub trait Persistent {
    fn serialize_state(&self) -> Value;

    /// Restore from `data`, keeping defaults for anything missing or malformed
    fn hydrate(&mut self, data: &Value);
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("save is not a JSON object")]
    NotAnObject,

    #[error("save version {found} is newer than supported version {supported}")]
    FutureVersion { found: u32, supported: u32 },

    #[error("could not access save file: {0}")]
    Io(#[from] std::io::Error),
}

/// Whole-game save blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    pub zone: ZoneId,
    #[serde(default)]
    pub elapsed: f32,
    #[serde(default)]
    pub party: Value,
    #[serde(default)]
    pub inventory: Value,
    #[serde(default)]
    pub quests: Value,
    #[serde(default)]
    pub progression: Value,
    #[serde(default)]
    pub dungeon: Value,
    #[serde(default)]
    pub experience: Value,
}

impl SaveGame {
    pub fn to_json_string(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a save, checking the version before the body.
    ///
    /// Only a future version or a non-object blob fails. Everything else is
    /// repaired field by field: an unknown zone becomes town, a bad `elapsed`
    /// becomes zero.
    pub fn from_json_str(s: &str) -> Result<Self, PersistenceError> {
        let raw: Value = serde_json::from_str(s)?;
        if !raw.is_object() {
            return Err(PersistenceError::NotAnObject);
        }

        let version = match field_u64(&raw, "version", CURRENT_SAVE_VERSION as u64) {
            0 => CURRENT_SAVE_VERSION as u64,
            v => v,
        };
        if version > CURRENT_SAVE_VERSION as u64 {
            return Err(PersistenceError::FutureVersion {
                found: version.min(u32::MAX as u64) as u32,
                supported: CURRENT_SAVE_VERSION,
            });
        }

        let zone = field_as::<ZoneId>(&raw, "zone").unwrap_or_else(|| {
            warn!("Save has no valid zone, starting in town");
            ZoneId::Town
        });
        let section = |key: &str| raw.get(key).cloned().unwrap_or(Value::Null);

        Ok(Self {
            version: version as u32,
            zone,
            elapsed: field_f32(&raw, "elapsed", 0.0),
            party: section("party"),
            inventory: section("inventory"),
            quests: section("quests"),
            progression: section("progression"),
            dungeon: section("dungeon"),
            experience: section("experience"),
        })
    }

    pub fn write_to(&self, path: &std::path::Path) -> Result<(), PersistenceError> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn read_from(path: &std::path::Path) -> Result<Self, PersistenceError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

// =====================================================
// Tolerant field access
// =====================================================

fn malformed(key: &str, found: &Value) {
    warn!(field = key, found = %found, "Malformed saved field, using default");
}

/// Unsigned integer field. Accepts non-negative whole floats.
pub fn field_u64(data: &Value, key: &str, default: u64) -> u64 {
    match data.get(key) {
        None | Some(Value::Null) => default,
        Some(v) => match v.as_u64().or_else(|| {
            v.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }) {
            Some(n) => n,
            None => {
                malformed(key, v);
                default
            }
        },
    }
}

/// Finite float field
pub fn field_f32(data: &Value, key: &str, default: f32) -> f32 {
    match data.get(key) {
        None | Some(Value::Null) => default,
        Some(v) => match v.as_f64().filter(|f| f.is_finite()) {
            Some(f) => f as f32,
            None => {
                malformed(key, v);
                default
            }
        },
    }
}

pub fn field_bool(data: &Value, key: &str, default: bool) -> bool {
    match data.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(v) => {
            malformed(key, v);
            default
        }
    }
}

pub fn field_str<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

/// Array field, empty when missing or not an array
pub fn field_array<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    match data.get(key) {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => &[],
        Some(v) => {
            malformed(key, v);
            &[]
        }
    }
}

/// Object field, `None` when missing or not an object
pub fn field_object<'a>(data: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    match data.get(key) {
        Some(Value::Object(map)) => Some(map),
        None | Some(Value::Null) => None,
        Some(v) => {
            malformed(key, v);
            None
        }
    }
}

/// Typed field through serde, `None` (with a warning) on shape mismatch
pub fn field_as<T: serde::de::DeserializeOwned>(data: &Value, key: &str) -> Option<T> {
    let raw = data.get(key)?;
    if raw.is_null() {
        return None;
    }
    match serde_json::from_value(raw.clone()) {
        Ok(v) => Some(v),
        Err(_) => {
            malformed(key, raw);
            None
        }
    }
}

/// Decode every element that parses, dropping the rest
pub fn decode_list<T: serde::de::DeserializeOwned>(items: &[Value]) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(found = %item, "Dropping malformed saved entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_helpers_fall_back() {
        let data = json!({
            "n": 7,
            "f": 2.5,
            "neg": -3,
            "s": "hello",
            "b": true,
            "arr": [1, 2],
            "obj": { "k": 1 },
            "bad_arr": 5,
        });

        assert_eq!(field_u64(&data, "n", 0), 7);
        assert_eq!(field_u64(&data, "f", 0), 2);
        assert_eq!(field_u64(&data, "neg", 9), 9);
        assert_eq!(field_u64(&data, "missing", 3), 3);
        assert_eq!(field_u64(&data, "s", 4), 4);
        assert!((field_f32(&data, "f", 0.0) - 2.5).abs() < f32::EPSILON);
        assert!(field_bool(&data, "b", false));
        assert!(!field_bool(&data, "n", false));
        assert_eq!(field_str(&data, "s"), Some("hello"));
        assert_eq!(field_array(&data, "arr").len(), 2);
        assert!(field_array(&data, "bad_arr").is_empty());
        assert!(field_object(&data, "obj").is_some());
        assert!(field_object(&data, "arr").is_none());
    }

    #[test]
    fn test_field_as_and_decode_list() {
        let data = json!({ "zone": "meadow", "zones": ["town", 4, "ruins"] });
        assert_eq!(field_as::<ZoneId>(&data, "zone"), Some(ZoneId::Meadow));
        assert_eq!(field_as::<ZoneId>(&data, "zones"), None);
        let zones: Vec<ZoneId> = decode_list(field_array(&data, "zones"));
        assert_eq!(zones, vec![ZoneId::Town, ZoneId::Ruins]);
    }

    #[test]
    fn test_rejects_future_version() {
        let err = SaveGame::from_json_str(r#"{ "version": 99, "zone": "town" }"#);
        assert!(matches!(
            err,
            Err(PersistenceError::FutureVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_missing_version_reads_as_current() {
        let save = SaveGame::from_json_str(r#"{ "zone": "town" }"#).unwrap();
        assert_eq!(save.version, CURRENT_SAVE_VERSION);
        let save = SaveGame::from_json_str(r#"{ "version": 1.0, "zone": "meadow" }"#).unwrap();
        assert_eq!(save.version, 1);
        assert_eq!(save.zone, ZoneId::Meadow);
        assert!(matches!(
            SaveGame::from_json_str("not json"),
            Err(PersistenceError::InvalidJson(_))
        ));
        assert!(matches!(
            SaveGame::from_json_str("[1, 2]"),
            Err(PersistenceError::NotAnObject)
        ));
    }

    #[test]
    fn test_malformed_elapsed_defaults() {
        let save = SaveGame::from_json_str(
            r#"{ "version": 1, "zone": "ruins", "elapsed": "oops", "inventory": { "gold": 9 } }"#,
        )
        .unwrap();
        assert_eq!(save.elapsed, 0.0);
        assert_eq!(save.zone, ZoneId::Ruins);
        assert_eq!(save.inventory["gold"], 9);
    }

    #[test]
    fn test_unknown_zone_defaults_to_town() {
        let save = SaveGame::from_json_str(r#"{ "version": 1, "zone": "moon" }"#);
        let save = save.unwrap();
        assert_eq!(save.zone, ZoneId::Town);
        assert!(save.party.is_null());
    }
}
