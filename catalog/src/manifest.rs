//! TOML manifests describing alternative catalogs.

use city_builder_core::{BuildingSpec, BuildingTypeId, CellRectSize, RankLevel};
use serde::Deserialize;

use crate::{Catalog, CatalogError, RankLadder};

/// Manifest version understood by [`Catalog::from_toml_str`].
pub const SUPPORTED_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    #[serde(default)]
    buildings: Vec<BuildingEntry>,
    ranks: Option<Vec<RankEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuildingEntry {
    id: String,
    name: String,
    cost: u32,
    size: (u32, u32),
    #[serde(default)]
    power_gen: u32,
    #[serde(default)]
    power_con: u32,
    #[serde(default)]
    population_cap: u32,
    #[serde(default)]
    ore_prod: u32,
    #[serde(default)]
    unlock_rank: u8,
    value: u32,
    glyph: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RankEntry {
    name: String,
    value_needed: i64,
}

pub(crate) fn parse(contents: &str) -> Result<Catalog, CatalogError> {
    let manifest: Manifest = toml::from_str(contents)?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        return Err(CatalogError::UnsupportedVersion {
            found: manifest.version,
            expected: SUPPORTED_MANIFEST_VERSION,
        });
    }

    let buildings = manifest
        .buildings
        .into_iter()
        .map(BuildingEntry::into_spec)
        .collect::<Result<Vec<_>, _>>()?;

    // Manifests without a ladder reuse the standard ranks.
    let ranks = match manifest.ranks {
        Some(entries) => RankLadder::new(
            entries
                .into_iter()
                .map(|entry| (entry.name, entry.value_needed)),
        )?,
        None => Catalog::standard().ranks().clone(),
    };

    Catalog::new(buildings, ranks)
}

impl BuildingEntry {
    fn into_spec(self) -> Result<BuildingSpec, CatalogError> {
        let id = BuildingTypeId::new(self.id);
        let mut chars = self.glyph.chars();
        let glyph = match (chars.next(), chars.next()) {
            (Some(glyph), None) => glyph,
            _ => {
                return Err(CatalogError::InvalidGlyph {
                    kind: id,
                    glyph: self.glyph,
                });
            }
        };

        Ok(BuildingSpec {
            id,
            name: self.name,
            cost: self.cost,
            size: CellRectSize::new(self.size.0, self.size.1),
            power_generation: self.power_gen,
            power_consumption: self.power_con,
            population_capacity: self.population_cap,
            ore_production: self.ore_prod,
            unlock_rank: RankLevel::new(self.unlock_rank),
            value: self.value,
            glyph,
        })
    }
}
