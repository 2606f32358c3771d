#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable building catalog and rank ladder for the city builder.
//!
//! A [`Catalog`] maps building type identifiers to their [`BuildingSpec`]
//! and carries the [`RankLadder`] that gates which buildings are offered.
//! The process-wide standard catalog is built once on first use through
//! [`Catalog::standard`] and never mutated afterwards. Alternative catalogs
//! come from TOML manifests or from [`Catalog::with_entry`], which yields a
//! new catalog and leaves the original untouched.

use std::sync::{Arc, OnceLock};

use city_builder_core::{BuildingSpec, BuildingTypeId, RankLevel};

mod manifest;
mod ranks;
mod standard;

pub use manifest::SUPPORTED_MANIFEST_VERSION;
pub use ranks::RankLadder;

static STANDARD_CATALOG: OnceLock<Arc<Catalog>> = OnceLock::new();

/// Errors raised while resolving catalog entries or validating catalog data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The identifier does not name a catalog entry.
    #[error("Unknown building type: {kind}")]
    UnknownBuildingType {
        /// Identifier that failed to resolve.
        kind: BuildingTypeId,
    },
    /// The manifest could not be parsed as TOML.
    #[error("could not parse catalog manifest: {0}")]
    InvalidManifest(#[from] toml::de::Error),
    /// The manifest declares a version this build does not understand.
    #[error("unsupported catalog manifest version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version declared by the manifest.
        found: u32,
        /// Version understood by this build.
        expected: u32,
    },
    /// Two entries share the same identifier.
    #[error("catalog contains duplicate entry for {kind}")]
    DuplicateBuilding {
        /// Identifier declared more than once.
        kind: BuildingTypeId,
    },
    /// An entry declares a footprint with zero width or height.
    #[error("building {kind} has an empty footprint")]
    EmptyFootprint {
        /// Offending identifier.
        kind: BuildingTypeId,
    },
    /// An entry's glyph is not exactly one character.
    #[error("building {kind} glyph `{glyph}` must be a single character")]
    InvalidGlyph {
        /// Offending identifier.
        kind: BuildingTypeId,
        /// Glyph text found in the manifest.
        glyph: String,
    },
    /// The rank ladder has no tiers.
    #[error("rank ladder must contain at least one tier")]
    EmptyRankLadder,
    /// The first tier requires a non-zero value, leaving new cities unranked.
    #[error("first rank tier must require a value of 0, found {value_needed}")]
    FirstRankNotFree {
        /// Threshold declared by the first tier.
        value_needed: i64,
    },
    /// Thresholds do not strictly increase along the ladder.
    #[error("rank tier `{name}` must require more value than the tier before it")]
    RanksNotAscending {
        /// Name of the out-of-order tier.
        name: String,
    },
    /// The ladder holds more tiers than a [`RankLevel`] can index.
    #[error("rank ladder holds {count} tiers, more than can be indexed")]
    TooManyRanks {
        /// Number of tiers declared.
        count: usize,
    },
}

/// Immutable mapping from building type identifier to specification.
#[derive(Clone, Debug)]
pub struct Catalog {
    buildings: Vec<Arc<BuildingSpec>>,
    ranks: RankLadder,
}

impl Catalog {
    /// Creates a catalog from explicit entries, in menu order.
    pub fn new(buildings: Vec<BuildingSpec>, ranks: RankLadder) -> Result<Self, CatalogError> {
        let mut entries: Vec<Arc<BuildingSpec>> = Vec::with_capacity(buildings.len());
        for spec in buildings {
            validate_spec(&spec)?;
            if entries.iter().any(|existing| existing.id == spec.id) {
                return Err(CatalogError::DuplicateBuilding { kind: spec.id });
            }
            entries.push(Arc::new(spec));
        }
        Ok(Self {
            buildings: entries,
            ranks,
        })
    }

    /// Returns the shared standard catalog, building it on first use.
    #[must_use]
    pub fn standard() -> Arc<Self> {
        Arc::clone(STANDARD_CATALOG.get_or_init(|| Arc::new(standard::catalog())))
    }

    /// Parses a catalog from a TOML manifest.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        manifest::parse(contents)
    }

    /// Resolves the specification registered for `kind`.
    pub fn spec_for(&self, kind: &BuildingTypeId) -> Result<&Arc<BuildingSpec>, CatalogError> {
        self.buildings
            .iter()
            .find(|spec| spec.id == *kind)
            .ok_or_else(|| CatalogError::UnknownBuildingType { kind: kind.clone() })
    }

    /// Lists the specifications unlocked at `rank`, in menu order.
    #[must_use]
    pub fn available_at(&self, rank: RankLevel) -> Vec<&BuildingSpec> {
        self.buildings
            .iter()
            .map(AsRef::as_ref)
            .filter(|spec| spec.unlock_rank <= rank)
            .collect()
    }

    /// Iterates over every specification in menu order.
    pub fn iter(&self) -> impl Iterator<Item = &BuildingSpec> {
        self.buildings.iter().map(AsRef::as_ref)
    }

    /// Number of building types in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    /// Reports whether the catalog holds no building types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Rank ladder associated with this catalog.
    #[must_use]
    pub const fn ranks(&self) -> &RankLadder {
        &self.ranks
    }

    /// Produces a new catalog with `spec` added, or replacing the entry with the same id.
    ///
    /// The receiver is left unchanged, so an override only reaches the cities
    /// explicitly constructed with the returned catalog.
    pub fn with_entry(&self, spec: BuildingSpec) -> Result<Self, CatalogError> {
        validate_spec(&spec)?;
        let mut buildings = self.buildings.clone();
        let replacement = Arc::new(spec);
        match buildings
            .iter_mut()
            .find(|existing| existing.id == replacement.id)
        {
            Some(slot) => *slot = replacement,
            None => buildings.push(replacement),
        }
        Ok(Self {
            buildings,
            ranks: self.ranks.clone(),
        })
    }
}

fn validate_spec(spec: &BuildingSpec) -> Result<(), CatalogError> {
    if spec.size.width() == 0 || spec.size.height() == 0 {
        return Err(CatalogError::EmptyFootprint {
            kind: spec.id.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_builder_core::CellRectSize;

    fn kind(value: &str) -> BuildingTypeId {
        BuildingTypeId::new(value)
    }

    #[test]
    fn standard_catalog_is_shared() {
        let first = Catalog::standard();
        let second = Catalog::standard();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn spec_for_resolves_known_types() {
        let catalog = Catalog::standard();
        let solar = catalog.spec_for(&kind("SOLAR_PANEL")).expect("solar panel");
        assert_eq!(solar.cost, 500);
        assert_eq!(solar.power_generation, 50);
        assert_eq!(solar.size, CellRectSize::new(1, 1));
        assert_eq!(solar.glyph, 'S');
    }

    #[test]
    fn spec_for_reports_unknown_types() {
        let catalog = Catalog::standard();
        let error = catalog
            .spec_for(&kind("NON_EXISTENT_TYPE"))
            .expect_err("unknown type");
        assert!(matches!(
            error,
            CatalogError::UnknownBuildingType { kind: ref missing } if missing.as_str() == "NON_EXISTENT_TYPE"
        ));
    }

    #[test]
    fn availability_respects_unlock_rank() {
        let catalog = Catalog::standard();
        let base: Vec<&str> = catalog
            .available_at(RankLevel::BASE)
            .into_iter()
            .map(|spec| spec.id.as_str())
            .collect();
        assert_eq!(base, vec!["SOLAR_PANEL", "HABITAT_SMALL"]);

        let hamlet = catalog.available_at(RankLevel::new(1));
        assert_eq!(hamlet.len(), 3);
        assert_eq!(hamlet[2].id.as_str(), "ORE_MINE_BASIC");
    }

    #[test]
    fn with_entry_leaves_receiver_untouched() {
        let standard = Catalog::standard();
        let mut reactor = standard
            .spec_for(&kind("SOLAR_PANEL"))
            .expect("solar")
            .as_ref()
            .clone();
        reactor.id = kind("TEST_REACTOR");
        reactor.power_generation = 1_000;

        let extended = standard.with_entry(reactor).expect("valid override");
        assert_eq!(extended.len(), 4);
        assert!(extended.spec_for(&kind("TEST_REACTOR")).is_ok());
        assert!(standard.spec_for(&kind("TEST_REACTOR")).is_err());
        assert!(Catalog::standard().spec_for(&kind("TEST_REACTOR")).is_err());
    }

    #[test]
    fn with_entry_replaces_matching_identifier_in_place() {
        let standard = Catalog::standard();
        let mut cheap = standard
            .spec_for(&kind("HABITAT_SMALL"))
            .expect("habitat")
            .as_ref()
            .clone();
        cheap.cost = 1;

        let overridden = standard.with_entry(cheap).expect("valid override");
        assert_eq!(overridden.len(), standard.len());
        let ids: Vec<&str> = overridden.iter().map(|spec| spec.id.as_str()).collect();
        assert_eq!(ids, vec!["SOLAR_PANEL", "HABITAT_SMALL", "ORE_MINE_BASIC"]);
        assert_eq!(
            overridden.spec_for(&kind("HABITAT_SMALL")).expect("habitat").cost,
            1
        );
    }

    #[test]
    fn new_rejects_duplicates_and_empty_footprints() {
        let standard = Catalog::standard();
        let solar = standard
            .spec_for(&kind("SOLAR_PANEL"))
            .expect("solar")
            .as_ref()
            .clone();

        let duplicate = Catalog::new(vec![solar.clone(), solar.clone()], standard.ranks().clone());
        assert!(matches!(
            duplicate,
            Err(CatalogError::DuplicateBuilding { .. })
        ));

        let mut flat = solar;
        flat.size = CellRectSize::new(0, 1);
        let empty = Catalog::new(vec![flat], standard.ranks().clone());
        assert!(matches!(empty, Err(CatalogError::EmptyFootprint { .. })));
    }
}
