use std::sync::Arc;

use city_builder_catalog::Catalog;
use city_builder_core::{
    BuildingId, BuildingSpec, BuildingTypeId, CellCoord, CellRect, CellRectSize, Command, Event,
    PlacementError, RankLevel, RemovalError, SimulationConfig,
};
use city_builder_world::{apply, query, City};

fn kind(id: &str) -> BuildingTypeId {
    BuildingTypeId::new(id)
}

#[test]
fn placement_command_reports_placed_building() {
    let mut city = City::new();
    let mut events = Vec::new();

    apply(
        &mut city,
        Command::PlaceBuilding {
            kind: kind("SOLAR_PANEL"),
            origin: CellCoord::new(2, 3),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::BuildingPlaced {
            building: BuildingId::new(0),
            kind: kind("SOLAR_PANEL"),
            region: CellRect::from_origin_and_size(CellCoord::new(2, 3), CellRectSize::new(1, 1)),
        }],
    );
}

#[test]
fn rejected_placement_emits_reason_only() {
    let mut city = City::new();
    let mut events = Vec::new();

    apply(
        &mut city,
        Command::PlaceBuilding {
            kind: kind("HABITAT_SMALL"),
            origin: CellCoord::new(24, 14),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::PlacementRejected {
            kind: kind("HABITAT_SMALL"),
            origin: CellCoord::new(24, 14),
            reason: PlacementError::OutOfBounds,
        }],
        "a rejected placement must not run a tick or report follow-up events",
    );
    assert_eq!(query::tick_count(&city), 0);
}

#[test]
fn removal_command_reports_refund() {
    let mut city = City::new();
    let mut events = Vec::new();
    apply(
        &mut city,
        Command::PlaceBuilding {
            kind: kind("HABITAT_SMALL"),
            origin: CellCoord::new(0, 0),
        },
        &mut events,
    );
    events.clear();

    apply(
        &mut city,
        Command::RemoveBuilding {
            cell: CellCoord::new(1, 1),
        },
        &mut events,
    );
    apply(
        &mut city,
        Command::RemoveBuilding {
            cell: CellCoord::new(1, 1),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::BuildingRemoved {
                building: BuildingId::new(0),
                kind: kind("HABITAT_SMALL"),
                region: CellRect::from_origin_and_size(
                    CellCoord::new(0, 0),
                    CellRectSize::new(2, 2)
                ),
                refund: 500,
            },
            Event::RemovalRejected {
                cell: CellCoord::new(1, 1),
                reason: RemovalError::NoBuildingAtPosition {
                    cell: CellCoord::new(1, 1)
                },
            },
        ],
    );
}

#[test]
fn tick_command_reports_running_tick_index() {
    let mut city = City::new();
    let mut events = Vec::new();
    apply(
        &mut city,
        Command::PlaceBuilding {
            kind: kind("SOLAR_PANEL"),
            origin: CellCoord::new(0, 0),
        },
        &mut events,
    );
    events.clear();

    apply(&mut city, Command::Tick, &mut events);
    apply(&mut city, Command::Tick, &mut events);

    assert_eq!(
        events,
        vec![
            Event::TimeAdvanced { tick: 2 },
            Event::TimeAdvanced { tick: 3 },
        ],
        "placement ticks count toward the tick index",
    );
}

#[test]
fn shortage_is_reported_after_each_step() {
    let config = SimulationConfig {
        base_power: 15,
        ..SimulationConfig::default()
    };
    let mut city = City::with_config(config);
    let mut events = Vec::new();
    for column in [0, 2] {
        apply(
            &mut city,
            Command::PlaceBuilding {
                kind: kind("HABITAT_SMALL"),
                origin: CellCoord::new(column, 0),
            },
            &mut events,
        );
    }
    apply(&mut city, Command::Tick, &mut events);

    let shortages: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::PowerShortage { .. }))
        .collect();
    assert_eq!(
        shortages,
        vec![
            &Event::PowerShortage {
                offline: vec![BuildingId::new(0)]
            },
            &Event::PowerShortage {
                offline: vec![BuildingId::new(0)]
            },
        ],
    );
}

#[test]
fn rank_advance_follows_placement_event() {
    let config = SimulationConfig {
        initial_credits: 1_000,
        initial_ore: 0,
        ..SimulationConfig::default()
    };
    let monument = BuildingSpec {
        id: kind("MONUMENT"),
        name: "Monument".to_owned(),
        cost: 100,
        size: CellRectSize::new(1, 1),
        power_generation: 0,
        power_consumption: 0,
        population_capacity: 0,
        ore_production: 0,
        unlock_rank: RankLevel::BASE,
        value: 5_000,
        glyph: 'O',
    };
    let catalog = Arc::new(
        Catalog::standard()
            .with_entry(monument)
            .expect("override accepted"),
    );
    let mut city = City::with_catalog(config, catalog);
    let mut events = Vec::new();

    apply(
        &mut city,
        Command::PlaceBuilding {
            kind: kind("MONUMENT"),
            origin: CellCoord::new(0, 0),
        },
        &mut events,
    );

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        Event::RankAdvanced {
            from: RankLevel::BASE,
            to: RankLevel::new(1),
        }
    );
}
