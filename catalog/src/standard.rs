//! Built-in building and rank data.

use std::sync::Arc;

use city_builder_core::{BuildingSpec, BuildingTypeId, CellRectSize, RankLevel, RankTier};

use crate::{Catalog, RankLadder};

const RANKS: [(&str, i64); 6] = [
    ("Outpost", 0),
    ("Hamlet", 5_000),
    ("Village", 20_000),
    ("Town", 100_000),
    ("City", 500_000),
    ("Metropolis", 2_000_000),
];

pub(crate) fn catalog() -> Catalog {
    let buildings = vec![
        BuildingSpec {
            id: BuildingTypeId::new("SOLAR_PANEL"),
            name: "Solar Panel".to_owned(),
            cost: 500,
            size: CellRectSize::new(1, 1),
            power_generation: 50,
            power_consumption: 0,
            population_capacity: 0,
            ore_production: 0,
            unlock_rank: RankLevel::BASE,
            value: 300,
            glyph: 'S',
        },
        BuildingSpec {
            id: BuildingTypeId::new("HABITAT_SMALL"),
            name: "Small Habitat".to_owned(),
            cost: 1_000,
            size: CellRectSize::new(2, 2),
            power_generation: 0,
            power_consumption: 10,
            population_capacity: 50,
            ore_production: 0,
            unlock_rank: RankLevel::BASE,
            value: 800,
            glyph: 'H',
        },
        BuildingSpec {
            id: BuildingTypeId::new("ORE_MINE_BASIC"),
            name: "Basic Ore Mine".to_owned(),
            cost: 1_500,
            size: CellRectSize::new(2, 2),
            power_generation: 0,
            power_consumption: 20,
            population_capacity: 0,
            ore_production: 5,
            unlock_rank: RankLevel::new(1),
            value: 1_000,
            glyph: 'M',
        },
    ];

    let tiers = RANKS
        .iter()
        .zip(0u8..)
        .map(|(&(name, value_needed), level)| RankTier {
            level: RankLevel::new(level),
            name: name.to_owned(),
            value_needed,
        })
        .collect();

    Catalog {
        buildings: buildings.into_iter().map(Arc::new).collect(),
        ranks: RankLadder::from_validated(tiers),
    }
}
