//! Shared rating context handed to every calculator

use crate::assumptions::{ProductRules, RateSource};
use crate::error::CalcError;
use crate::money::Amount;

/// Whether amounts are for the quote being issued or for a later policy year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalcMode {
    /// Issue-date quote: entry ceilings apply and missing rates are fatal
    #[default]
    Current,
    /// Future policy year: renewal ceilings apply and missing rates rate as 0
    Projected,
}

/// Rate tables, product rules and mode for one pass
#[derive(Debug, Clone, Copy)]
pub struct RatingContext<'a, R: RateSource> {
    pub rates: &'a R,
    pub rules: &'a ProductRules,
    pub mode: CalcMode,
}

impl<'a, R: RateSource> RatingContext<'a, R> {
    pub fn new(rates: &'a R, rules: &'a ProductRules, mode: CalcMode) -> Self {
        Self { rates, rules, mode }
    }

    /// Rate a missing table row according to the mode
    pub(crate) fn missing_rate(&self, table: &str, age: u32) -> Result<Amount, CalcError> {
        match self.mode {
            CalcMode::Current => Err(CalcError::missing_rate(table, age)),
            CalcMode::Projected => Ok(0),
        }
    }

    pub(crate) fn is_current(&self) -> bool {
        self.mode == CalcMode::Current
    }
}
