//! Rank tiers unlocked by cumulative city value.

use city_builder_core::{RankLevel, RankTier};

use crate::CatalogError;

/// Ordered rank tiers with strictly ascending value thresholds.
///
/// Tier levels are assigned by position, so the first tier is always
/// [`RankLevel::BASE`] and requires a value of zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankLadder {
    tiers: Vec<RankTier>,
}

impl RankLadder {
    /// Builds a ladder from `(name, value_needed)` pairs in ascending order.
    pub fn new<I, S>(tiers: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut built: Vec<RankTier> = Vec::new();
        for (index, (name, value_needed)) in tiers.into_iter().enumerate() {
            let name = name.into();
            let level = u8::try_from(index).map_err(|_| CatalogError::TooManyRanks {
                count: index.saturating_add(1),
            })?;
            match built.last() {
                None if value_needed != 0 => {
                    return Err(CatalogError::FirstRankNotFree { value_needed });
                }
                Some(previous) if value_needed <= previous.value_needed => {
                    return Err(CatalogError::RanksNotAscending { name });
                }
                _ => {}
            }
            built.push(RankTier {
                level: RankLevel::new(level),
                name,
                value_needed,
            });
        }

        if built.is_empty() {
            return Err(CatalogError::EmptyRankLadder);
        }
        Ok(Self { tiers: built })
    }

    /// Wraps tiers already known to satisfy the ladder invariants.
    pub(crate) fn from_validated(tiers: Vec<RankTier>) -> Self {
        Self { tiers }
    }

    /// Returns the tier at `level`, if the ladder reaches that high.
    #[must_use]
    pub fn tier(&self, level: RankLevel) -> Option<&RankTier> {
        self.tiers.get(usize::from(level.get()))
    }

    /// Highest level the ladder offers.
    #[must_use]
    pub fn highest(&self) -> RankLevel {
        self.tiers
            .last()
            .map_or(RankLevel::BASE, |tier| tier.level)
    }

    /// Limits `level` to the levels the ladder defines.
    #[must_use]
    pub fn clamp(&self, level: RankLevel) -> RankLevel {
        level.min(self.highest())
    }

    /// Display name of `level`, clamped to the ladder.
    #[must_use]
    pub fn name(&self, level: RankLevel) -> &str {
        self.tier(self.clamp(level))
            .map_or("", |tier| tier.name.as_str())
    }

    /// Iterates over the tiers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &RankTier> {
        self.tiers.iter()
    }

    /// Computes the rank held after observing `city_value`.
    ///
    /// The result is the highest tier whose threshold the value meets, but
    /// never lower than `current`: ranks are not lost when value drops.
    #[must_use]
    pub fn ratchet(&self, current: RankLevel, city_value: i64) -> RankLevel {
        let reached = self
            .tiers
            .iter()
            .take_while(|tier| tier.value_needed <= city_value)
            .last()
            .map_or(RankLevel::BASE, |tier| tier.level);
        current.max(reached)
    }
}
