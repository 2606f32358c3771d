use city_builder_catalog::Catalog;
use city_builder_core::{BuildingSpec, BuildingTypeId, CellCoord, RemovalError, SimulationConfig};
use city_builder_world::{query, City};

fn kind(id: &str) -> BuildingTypeId {
    BuildingTypeId::new(id)
}

#[test]
fn removal_by_any_covered_cell_refunds_half_cost() {
    let mut city = City::new();
    let placed = city
        .place_building(&kind("HABITAT_SMALL"), CellCoord::new(3, 3))
        .expect("habitat placed");

    let removed = city
        .remove_building(CellCoord::new(4, 4))
        .expect("habitat removed");

    assert_eq!(removed.building.id, placed.building.id);
    assert_eq!(removed.refund, 500);
    assert_eq!(
        removed.message,
        "Small Habitat removed. 500 credits refunded."
    );
    assert_eq!(query::resources(&city).credits, 9_500);
    assert!(
        query::occupancy_view(&city).iter().all(|cell| cell.is_none()),
        "every cell of the demolished footprint should be cleared",
    );
    assert!(query::buildings(&city).is_empty());
    assert_eq!(query::tick_count(&city), 2);
}

#[test]
fn empty_cell_is_rejected_without_side_effects() {
    let mut city = City::new();
    let _ = city
        .place_building(&kind("SOLAR_PANEL"), CellCoord::new(0, 0))
        .expect("solar placed");
    let before = query::resources(&city);

    let error = city
        .remove_building(CellCoord::new(1, 0))
        .expect_err("nothing to remove");

    assert_eq!(
        error,
        RemovalError::NoBuildingAtPosition {
            cell: CellCoord::new(1, 0)
        }
    );
    assert_eq!(error.to_string(), "No building at that position (1, 0).");
    assert_eq!(query::resources(&city), before);
    assert_eq!(query::building_count(&city), 1);
    assert_eq!(query::tick_count(&city), 1);
}

#[test]
fn odd_costs_refund_rounded_down() {
    let solar = BuildingSpec::clone(
        Catalog::standard()
            .spec_for(&kind("SOLAR_PANEL"))
            .expect("solar"),
    );
    let catalog = Catalog::standard()
        .with_entry(BuildingSpec { cost: 1_001, ..solar })
        .expect("override accepted");
    let mut city = City::with_catalog(SimulationConfig::default(), catalog.into());
    let _ = city
        .place_building(&kind("SOLAR_PANEL"), CellCoord::new(5, 5))
        .expect("solar placed");

    let removed = city
        .remove_building(CellCoord::new(5, 5))
        .expect("solar removed");

    assert_eq!(removed.refund, 500);
    assert_eq!(query::resources(&city).credits, 10_000 - 1_001 + 500);
}

#[test]
fn freed_cells_accept_new_buildings_with_fresh_identifiers() {
    let mut city = City::new();
    let first = city
        .place_building(&kind("HABITAT_SMALL"), CellCoord::new(0, 0))
        .expect("first habitat");
    let _ = city
        .remove_building(CellCoord::new(0, 0))
        .expect("habitat removed");

    let second = city
        .place_building(&kind("HABITAT_SMALL"), CellCoord::new(1, 1))
        .expect("second habitat");

    assert_ne!(first.building.id, second.building.id);
    assert_eq!(
        query::building_at(&city, CellCoord::new(2, 2)).map(|building| building.id),
        Some(second.building.id)
    );
}

#[test]
fn removal_restores_power_to_switched_off_buildings() {
    let config = SimulationConfig {
        base_power: 15,
        ..SimulationConfig::default()
    };
    let mut city = City::with_config(config);
    let _ = city
        .place_building(&kind("HABITAT_SMALL"), CellCoord::new(0, 0))
        .expect("first habitat");
    let _ = city
        .place_building(&kind("HABITAT_SMALL"), CellCoord::new(2, 0))
        .expect("second habitat");
    assert!(!query::buildings(&city)[0].operational);

    let _ = city
        .remove_building(CellCoord::new(3, 1))
        .expect("second habitat removed");

    let buildings = query::buildings(&city);
    assert_eq!(buildings.len(), 1);
    assert!(buildings[0].operational);
    assert_eq!(query::stats(&city).net_power, 5);
}
