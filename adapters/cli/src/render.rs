//! Plain-text presentation of city state and events.

use std::{collections::HashMap, fmt::Write as _};

use city_builder_core::{BuildingId, BuildingSpec, BuildingTypeId, CellCoord, Event};
use city_builder_world::{query, City};

const EMPTY_CELL: char = '.';

/// Resource and statistic summary.
pub(crate) fn status(city: &City) -> String {
    let resources = query::resources(city);
    let stats = query::stats(city);
    let mut out = String::new();
    let _ = writeln!(out, "Rank:       {} (level {})", stats.rank_name, stats.rank);
    let _ = writeln!(out, "Credits:    {}", resources.credits);
    let _ = writeln!(
        out,
        "Population: {} / {}",
        resources.population, stats.max_population_capacity
    );
    let _ = writeln!(out, "Ore:        {}", resources.ore);
    let _ = writeln!(
        out,
        "Power:      {} generated, {} consumed, net {}",
        stats.total_power_generation, stats.total_power_consumption, stats.net_power
    );
    let _ = writeln!(out, "City value: {}", stats.city_value);
    let _ = writeln!(out, "Buildings:  {}", query::building_count(city));
    out
}

/// Grid drawn with building glyphs, lowercase for offline buildings.
pub(crate) fn map(city: &City) -> String {
    let glyphs: HashMap<BuildingId, char> = query::buildings(city)
        .into_iter()
        .filter_map(|building| {
            let glyph = query::building_spec(city, building.id)?.glyph;
            let glyph = if building.operational {
                glyph
            } else {
                glyph.to_ascii_lowercase()
            };
            Some((building.id, glyph))
        })
        .collect();

    let view = query::occupancy_view(city);
    let (columns, rows) = view.dimensions();
    let mut out = String::new();
    for row in 0..rows {
        for column in 0..columns {
            let glyph = view
                .occupant(CellCoord::new(column, row))
                .and_then(|id| glyphs.get(&id).copied())
                .unwrap_or(EMPTY_CELL);
            out.push(glyph);
        }
        out.push('\n');
    }

    let legend: Vec<String> = query::catalog(city)
        .iter()
        .map(|spec| format!("{}={}", spec.glyph, spec.name))
        .collect();
    let _ = writeln!(out, "{}", legend.join("  "));
    out
}

/// Buildings unlocked at the current rank.
pub(crate) fn catalog(city: &City) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available at {}:", query::rank_name(city));
    for spec in query::available_buildings(city) {
        let _ = writeln!(
            out,
            "  {} {:<16} {:<16} {:>6} credits  {}x{}  {}",
            spec.glyph,
            spec.id,
            spec.name,
            spec.cost,
            spec.size.width(),
            spec.size.height(),
            effects(spec)
        );
    }
    out
}

fn effects(spec: &BuildingSpec) -> String {
    let mut parts = Vec::new();
    if spec.power_generation > 0 {
        parts.push(format!("+{} power", spec.power_generation));
    }
    if spec.power_consumption > 0 {
        parts.push(format!("-{} power", spec.power_consumption));
    }
    if spec.population_capacity > 0 {
        parts.push(format!("houses {}", spec.population_capacity));
    }
    if spec.ore_production > 0 {
        parts.push(format!("+{} ore", spec.ore_production));
    }
    parts.join(", ")
}

/// Player-facing line for an event, if it warrants one.
pub(crate) fn event(city: &City, event: &Event) -> Option<String> {
    match event {
        Event::BuildingPlaced { kind, .. } => Some(format!("{} placed.", display_name(city, kind))),
        Event::BuildingRemoved { kind, refund, .. } => Some(format!(
            "{} removed. {refund} credits refunded.",
            display_name(city, kind)
        )),
        Event::PlacementRejected { reason, .. } => Some(reason.to_string()),
        Event::RemovalRejected { reason, .. } => Some(reason.to_string()),
        Event::PowerShortage { offline } => Some(format!(
            "Power shortage: {} building(s) offline.",
            offline.len()
        )),
        Event::RankAdvanced { to, .. } => Some(format!(
            "City advanced to {}!",
            query::catalog(city).ranks().name(*to)
        )),
        Event::TimeAdvanced { .. } => None,
    }
}

fn display_name(city: &City, kind: &BuildingTypeId) -> String {
    query::catalog(city)
        .spec_for(kind)
        .map_or_else(|_| kind.to_string(), |spec| spec.name.clone())
}
