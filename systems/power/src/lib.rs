#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure power allocation system.
//!
//! Every recomputation starts from a clean slate: all buildings are assumed
//! operational and their generation and consumption are summed on top of the
//! city's base power. When consumption exceeds generation the allocator
//! switches off pure consumers, heaviest first, until the deficit is covered
//! or no pure consumers remain. Buildings that generate power are never
//! switched off. The heuristic is greedy and deliberately not optimal; its
//! deactivation order is part of the observable contract.

use std::cmp::Reverse;

use tracing::debug;

/// Power characteristics of a single building, in placement order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerLoad {
    /// Power contributed while operational.
    pub generation: u32,
    /// Power drawn while operational.
    pub consumption: u32,
}

impl PowerLoad {
    /// Creates a new load descriptor.
    #[must_use]
    pub const fn new(generation: u32, consumption: u32) -> Self {
        Self {
            generation,
            consumption,
        }
    }

    const fn is_pure_consumer(&self) -> bool {
        self.consumption > 0 && self.generation == 0
    }
}

/// Outcome of a power allocation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerAllocation {
    operational: Vec<bool>,
    total_generation: i64,
    total_consumption: i64,
}

impl PowerAllocation {
    /// Operational flag for each load, in the order the loads were supplied.
    #[must_use]
    pub fn operational(&self) -> &[bool] {
        &self.operational
    }

    /// Base power plus generation of operational loads.
    #[must_use]
    pub const fn total_generation(&self) -> i64 {
        self.total_generation
    }

    /// Consumption of operational loads.
    #[must_use]
    pub const fn total_consumption(&self) -> i64 {
        self.total_consumption
    }

    /// Generation minus consumption.
    #[must_use]
    pub const fn net(&self) -> i64 {
        self.total_generation - self.total_consumption
    }

    /// Indices of the loads switched off, in ascending order.
    pub fn offline(&self) -> impl Iterator<Item = usize> + '_ {
        self.operational
            .iter()
            .enumerate()
            .filter_map(|(index, operational)| (!operational).then_some(index))
    }
}

/// Allocates `base_power` plus building generation across `loads`.
#[must_use]
pub fn allocate(base_power: i64, loads: &[PowerLoad]) -> PowerAllocation {
    let mut operational = vec![true; loads.len()];
    let (total_generation, total_consumption) = totals(base_power, loads, &operational);
    let net = total_generation - total_consumption;

    if net >= 0 {
        return PowerAllocation {
            operational,
            total_generation,
            total_consumption,
        };
    }

    let mut consumers: Vec<usize> = loads
        .iter()
        .enumerate()
        .filter(|(_, load)| load.is_pure_consumer())
        .map(|(index, _)| index)
        .collect();
    // Stable sort: equal draws keep placement order.
    consumers.sort_by_key(|&index| Reverse(loads[index].consumption));

    let mut balance = net;
    let mut switched_off = 0usize;
    for index in consumers {
        if balance >= 0 {
            break;
        }
        operational[index] = false;
        balance += i64::from(loads[index].consumption);
        switched_off += 1;
    }

    let (total_generation, total_consumption) = totals(base_power, loads, &operational);
    debug!(
        deficit = net,
        switched_off,
        net = total_generation - total_consumption,
        "resolved power shortage"
    );

    PowerAllocation {
        operational,
        total_generation,
        total_consumption,
    }
}

fn totals(base_power: i64, loads: &[PowerLoad], operational: &[bool]) -> (i64, i64) {
    loads
        .iter()
        .zip(operational)
        .filter(|(_, operational)| **operational)
        .fold((base_power, 0), |(generation, consumption), (load, _)| {
            (
                generation + i64::from(load.generation),
                consumption + i64::from(load.consumption),
            )
        })
}
