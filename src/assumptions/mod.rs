//! Pricing assumptions: rate tables, occupations and product rules

mod rates;
mod product;
mod occupations;
pub mod loader;

pub use rates::{AgeBand, AgeBandTable, FactorRange, GenderRates, RateSource, RateTables};
pub use product::{
    AccidentRules, AgeWindow, AmountRange, FrequencyLoading, HealthTierRules, HospitalCashRules,
    ProductRules, ProductTerms, RiderWindows, TermOption,
};
pub use occupations::OccupationTable;
pub use loader::{RateFileSource, DEFAULT_RATES_PATH};

use std::path::Path;

use crate::error::DataError;

/// Container for everything a quote pass rates against
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub rates: RateTables,
    pub rules: ProductRules,
    pub occupations: OccupationTable,
}

impl Assumptions {
    /// Bundled tables with default product rules
    pub fn bundled() -> Result<Self, DataError> {
        Ok(Self {
            rates: RateTables::bundled()?,
            rules: ProductRules::default(),
            occupations: OccupationTable::bundled()?,
        })
    }

    /// Load tables from CSV files in the default location (data/rates/)
    pub fn from_csv() -> Result<Self, DataError> {
        Self::from_csv_path(Path::new(DEFAULT_RATES_PATH))
    }

    /// Load tables from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        Ok(Self {
            rates: RateTables::from_csv_path(path)?,
            rules: ProductRules::default(),
            occupations: OccupationTable::from_csv_path(path)?,
        })
    }

    /// Replace the product rules
    pub fn with_rules(mut self, rules: ProductRules) -> Self {
        self.rules = rules;
        self
    }
}
