#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure economy rules: population growth, income and valuation.
//!
//! These functions only run on powered turns; the world decides when a
//! turn counts as powered and feeds the results back into city state.

/// Share of the free housing capacity filled per tick, in percent.
pub const GROWTH_PERCENT: u64 = 1;
/// Valuation weight of a single resident.
pub const RESIDENT_VALUE: i64 = 10;
/// Valuation weight of a single unit of ore.
pub const ORE_VALUE: i64 = 2;

/// Population after one powered tick.
///
/// Below capacity the population grows by `GROWTH_PERCENT` of the free
/// capacity, rounded down, so small gaps never close. Above capacity the
/// population is clamped straight down to capacity.
#[must_use]
pub fn grow_population(population: u64, capacity: u64) -> u64 {
    if population < capacity {
        let growth = (capacity - population) * GROWTH_PERCENT / 100;
        population + growth
    } else {
        capacity
    }
}

/// Credits earned in one powered tick: one per resident.
#[must_use]
pub fn income(population: u64) -> i64 {
    i64::try_from(population).unwrap_or(i64::MAX)
}

/// Inputs combined into the single city value used for rank thresholds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Valuation {
    /// Sum of the display values of every building, operational or not.
    pub building_value: i64,
    /// Treasury balance.
    pub credits: i64,
    /// Current residents.
    pub population: u64,
    /// Ore stockpile.
    pub ore: u64,
}

impl Valuation {
    /// Structural value plus liquid resources.
    #[must_use]
    pub fn city_value(&self) -> i64 {
        self.building_value
            .saturating_add(self.credits)
            .saturating_add(weighted(self.population, RESIDENT_VALUE))
            .saturating_add(weighted(self.ore, ORE_VALUE))
    }
}

fn weighted(amount: u64, weight: i64) -> i64 {
    i64::try_from(amount)
        .unwrap_or(i64::MAX)
        .saturating_mul(weight)
}
