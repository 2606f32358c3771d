//! JSON save format for city snapshots.
//!
//! Decoding is lenient below the top level: missing scalars fall back to the
//! configured starting values and building entries that fail to decode are
//! skipped rather than failing the load.

use std::sync::Arc;

use city_builder_catalog::Catalog;
use city_builder_core::{RankLevel, SimulationConfig};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{
    snapshot::{BuildingRecord, CitySnapshot, LoadReport, SkipReason},
    City,
};

/// Errors that fail a whole load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The payload is not valid JSON or a top-level field has the wrong shape.
    #[error("malformed save data: {0}")]
    MalformedSaveData(#[from] serde_json::Error),
    /// The payload is valid JSON but not an object.
    #[error("malformed save data: expected a JSON object, found {found}")]
    NotAnObject {
        /// Kind of JSON value found at the top level.
        found: &'static str,
    },
}

/// Snapshot decoded from JSON together with the entries that were dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSnapshot {
    /// Snapshot with defaults applied for missing fields.
    pub snapshot: CitySnapshot,
    /// Entries that could not be decoded.
    pub skipped: Vec<SkipReason>,
}

#[derive(Deserialize)]
struct StoredCity {
    #[serde(default)]
    buildings: Vec<Value>,
    credits: Option<i64>,
    population: Option<u64>,
    ore: Option<u64>,
    current_rank_level: Option<u64>,
}

/// Encodes the snapshot as pretty-printed JSON.
pub fn encode(snapshot: &CitySnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

/// Decodes a snapshot, filling missing scalars from `config`.
pub fn decode(json: &str, config: &SimulationConfig) -> Result<DecodedSnapshot, LoadError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(LoadError::NotAnObject {
            found: json_kind(&value),
        });
    }
    let stored: StoredCity = serde_json::from_value(value)?;

    let mut buildings = Vec::with_capacity(stored.buildings.len());
    let mut skipped = Vec::new();
    for (position, entry) in stored.buildings.into_iter().enumerate() {
        match serde_json::from_value::<BuildingRecord>(entry) {
            Ok(record) => buildings.push(record),
            Err(error) => {
                let reason = SkipReason::MalformedEntry {
                    position,
                    message: error.to_string(),
                };
                warn!(%reason, "skipping stored building");
                skipped.push(reason);
            }
        }
    }

    Ok(DecodedSnapshot {
        snapshot: CitySnapshot {
            buildings,
            credits: stored.credits.unwrap_or(config.initial_credits),
            population: stored.population.unwrap_or(config.initial_population),
            ore: stored.ore.unwrap_or(config.initial_ore),
            current_rank_level: stored.current_rank_level.map_or(RankLevel::BASE, |level| {
                RankLevel::new(u8::try_from(level).unwrap_or(u8::MAX))
            }),
        },
        skipped,
    })
}

/// Decodes `json` and rebuilds a city backed by `catalog`.
pub fn load(
    json: &str,
    config: SimulationConfig,
    catalog: Arc<Catalog>,
) -> Result<LoadReport, LoadError> {
    let decoded = decode(json, &config)?;
    let mut report = City::from_snapshot(config, catalog, decoded.snapshot);
    let mut skipped = decoded.skipped;
    skipped.append(&mut report.skipped);
    report.skipped = skipped;
    Ok(report)
}

/// Encodes the persistent state of `city`.
pub fn save(city: &City) -> Result<String, serde_json::Error> {
    encode(&city.to_snapshot())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
