//! Premium illustration output

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::money::{saturating_sum, Amount};

/// Premiums due in one policy year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumRow {
    pub policy_year: u32,
    /// Main person's age in this policy year
    pub attained_age: u32,

    pub main_premium: Amount,
    pub extra_premium: Amount,
    /// All riders across persons, waiver excluded
    pub rider_premium: Amount,
    pub waiver_premium: Amount,
    pub total: Amount,
}

impl PremiumRow {
    pub fn new(policy_year: u32, attained_age: u32) -> Self {
        Self {
            policy_year,
            attained_age,
            main_premium: 0,
            extra_premium: 0,
            rider_premium: 0,
            waiver_premium: 0,
            total: 0,
        }
    }
}

/// Complete illustration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub rows: Vec<PremiumRow>,
}

impl ProjectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: PremiumRow) {
        self.rows.push(row);
    }

    pub fn summary(&self) -> ProjectionSummary {
        let sum = |f: fn(&PremiumRow) -> Amount| saturating_sum(self.rows.iter().map(f));
        ProjectionSummary {
            years: self.rows.len() as u32,
            total_main: sum(|r| r.main_premium),
            total_extra: sum(|r| r.extra_premium),
            total_riders: sum(|r| r.rider_premium),
            total_waiver: sum(|r| r.waiver_premium),
            total: sum(|r| r.total),
        }
    }

    /// Write one CSV record per policy year
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), DataError> {
        let mut out = csv::Writer::from_writer(writer);
        for row in &self.rows {
            out.serialize(row)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Totals over the illustrated years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub years: u32,
    pub total_main: Amount,
    pub total_extra: Amount,
    pub total_riders: Amount,
    pub total_waiver: Amount,
    pub total: Amount,
}
