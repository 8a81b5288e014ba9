//! Read-only rate tables and the lookup seam the calculators rate against

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::policy::{Gender, HealthAddon, HealthProgram, HealthScope, MainProduct};

/// Rate pair keyed by gender
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenderRates {
    pub male: f64,
    pub female: f64,
}

impl GenderRates {
    pub fn for_gender(&self, gender: Gender) -> f64 {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }
}

/// Allowed sum-insured to premium ratio for flexible-premium products
///
/// A premium `p` is acceptable for sum insured `s` when
/// `s / max_factor <= p <= s / min_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorRange {
    pub min_factor: f64,
    pub max_factor: f64,
}

/// One `[min, max]` inclusive age band
#[derive(Debug, Clone, PartialEq)]
pub struct AgeBand<T> {
    pub min_age: u32,
    pub max_age: u32,
    pub value: T,
}

/// Non-overlapping age bands, sorted by lower bound
#[derive(Debug, Clone, PartialEq)]
pub struct AgeBandTable<T> {
    bands: Vec<AgeBand<T>>,
}

impl<T> AgeBandTable<T> {
    /// Build a table, rejecting inverted or overlapping bands
    pub fn new(file: &str, mut bands: Vec<AgeBand<T>>) -> Result<Self, DataError> {
        bands.sort_by_key(|b| b.min_age);
        for (i, band) in bands.iter().enumerate() {
            if band.min_age > band.max_age {
                return Err(DataError::MalformedRow {
                    file: file.to_string(),
                    detail: format!("band [{}, {}] is inverted", band.min_age, band.max_age),
                });
            }
            if i > 0 && band.min_age <= bands[i - 1].max_age {
                return Err(DataError::OverlappingBand {
                    file: file.to_string(),
                    min: band.min_age,
                    max: band.max_age,
                });
            }
        }
        Ok(Self { bands })
    }

    pub fn lookup(&self, age: u32) -> Option<&T> {
        self.bands
            .iter()
            .find(|b| age >= b.min_age && age <= b.max_age)
            .map(|b| &b.value)
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

/// Keyed rate lookups consumed by the calculators
///
/// `None` means the table has no row for the key; whether that is fatal is the
/// caller's decision.
pub trait RateSource {
    /// Per-mille rate of a rated main product at an exact age
    fn main_rate(&self, product: MainProduct, term: u32, age: u32, gender: Gender) -> Option<f64>;

    /// Premium factor range of flexible-premium products for an age band
    fn premium_factors(&self, age: u32) -> Option<FactorRange>;

    /// Flat annual health-rider premium by program and scope
    fn health_rate(&self, program: HealthProgram, scope: HealthScope, age: u32) -> Option<f64>;

    /// Flat annual premium of a health add-on
    fn health_addon_rate(&self, addon: HealthAddon, program: HealthProgram, age: u32) -> Option<f64>;

    /// Per-mille critical-illness rate
    fn critical_illness_rate(&self, age: u32, gender: Gender) -> Option<f64>;

    /// Per-mille accident rate by risk group
    fn accident_rate(&self, risk_group: u8) -> Option<f64>;

    /// Hospital-cash rate per 100 units of daily benefit
    fn hospital_cash_rate(&self, age: u32) -> Option<f64>;

    /// Per-mille premium-waiver rate
    fn waiver_rate(&self, age: u32, gender: Gender) -> Option<f64>;
}

/// Rate tables for every product and rider
#[derive(Debug, Clone, Default)]
pub struct RateTables {
    pub(crate) main: HashMap<(MainProduct, u32), BTreeMap<u32, GenderRates>>,
    pub(crate) premium_factors: Option<AgeBandTable<FactorRange>>,
    pub(crate) health: HashMap<(HealthProgram, HealthScope), AgeBandTable<f64>>,
    pub(crate) health_addons: HashMap<(HealthAddon, HealthProgram), AgeBandTable<f64>>,
    pub(crate) critical_illness: Option<AgeBandTable<GenderRates>>,
    pub(crate) accident: BTreeMap<u8, f64>,
    pub(crate) hospital_cash: Option<AgeBandTable<f64>>,
    pub(crate) waiver: Option<AgeBandTable<GenderRates>>,
}

impl RateSource for RateTables {
    fn main_rate(&self, product: MainProduct, term: u32, age: u32, gender: Gender) -> Option<f64> {
        self.main
            .get(&(product, term))
            .and_then(|by_age| by_age.get(&age))
            .map(|r| r.for_gender(gender))
    }

    fn premium_factors(&self, age: u32) -> Option<FactorRange> {
        self.premium_factors.as_ref()?.lookup(age).copied()
    }

    fn health_rate(&self, program: HealthProgram, scope: HealthScope, age: u32) -> Option<f64> {
        self.health.get(&(program, scope))?.lookup(age).copied()
    }

    fn health_addon_rate(&self, addon: HealthAddon, program: HealthProgram, age: u32) -> Option<f64> {
        self.health_addons.get(&(addon, program))?.lookup(age).copied()
    }

    fn critical_illness_rate(&self, age: u32, gender: Gender) -> Option<f64> {
        self.critical_illness
            .as_ref()?
            .lookup(age)
            .map(|r| r.for_gender(gender))
    }

    fn accident_rate(&self, risk_group: u8) -> Option<f64> {
        self.accident.get(&risk_group).copied()
    }

    fn hospital_cash_rate(&self, age: u32) -> Option<f64> {
        self.hospital_cash.as_ref()?.lookup(age).copied()
    }

    fn waiver_rate(&self, age: u32, gender: Gender) -> Option<f64> {
        self.waiver.as_ref()?.lookup(age).map(|r| r.for_gender(gender))
    }
}
