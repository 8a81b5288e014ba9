//! Premium illustration engine
//!
//! Year 1 is the issue quote. Later years age every person by the policy
//! year and re-rate riders and the waiver in projected mode: riders run to
//! their renewal ceilings and a missing rate illustrates as 0. Main and extra
//! premiums are level and stop after the payment term.

use log::{debug, info};

use super::cashflows::{PremiumRow, ProjectionResult};
use crate::assumptions::{ProductRules, RateSource, RateTables};
use crate::error::CalcError;
use crate::money::{saturating_sum, Amount};
use crate::policy::PolicyState;
use crate::quote::{CalcMode, QuoteEngine, QuoteResult};

/// Illustrates premiums from issue to a target age
pub struct ProjectionEngine<'a, R: RateSource = RateTables> {
    quotes: QuoteEngine<'a, R>,
    rules: &'a ProductRules,
}

impl<'a, R: RateSource> ProjectionEngine<'a, R> {
    pub fn new(rates: &'a R, rules: &'a ProductRules) -> Self {
        Self {
            quotes: QuoteEngine::new(rates, rules),
            rules,
        }
    }

    /// Age of the main person at which the illustration stops
    ///
    /// Falls back to the end of the payment term and is clamped to the
    /// issue age and the coverage ceiling.
    pub fn target_age(&self, state: &PolicyState, target_age: Option<u32>) -> u32 {
        let age = state.main_person.profile.age;
        let term = self.rules.payment_term(&state.main);
        target_age
            .or(state.target_age)
            .unwrap_or(age.saturating_add(term).saturating_sub(1))
            .clamp(age, self.rules.max_coverage_age.max(age))
    }

    /// One row per policy year up to the target age
    pub fn project(&self, state: &PolicyState, target_age: Option<u32>) -> Result<ProjectionResult, CalcError> {
        let issue = self.quotes.quote(state)?;
        self.project_from(state, &issue, target_age)
    }

    /// Illustration continuing from an issue quote already computed
    pub fn project_from(
        &self,
        state: &PolicyState,
        issue: &QuoteResult,
        target_age: Option<u32>,
    ) -> Result<ProjectionResult, CalcError> {
        let issue_age = state.main_person.profile.age;
        let target = self.target_age(state, target_age);
        let term = self.rules.payment_term(&state.main);
        let main_base = issue.summary.base_main;
        let extra = issue.summary.extra;

        let mut result = ProjectionResult::new();
        result.add_row(self.row(1, issue_age, issue, term));

        for year in 2..=(target - issue_age + 1) {
            let aged = state.aged(year - 1);
            let pass = self.quotes.price_pass(&aged, main_base, extra, CalcMode::Projected)?;
            let row = self.row(year, issue_age + year - 1, &pass, term);
            debug!("policy year {} age {}: total {}", year, row.attained_age, row.total);
            result.add_row(row);
        }

        info!(
            "illustrated {} policy year(s) to age {}: total {}",
            result.rows.len(),
            target,
            result.summary().total
        );
        Ok(result)
    }

    fn row(&self, year: u32, attained_age: u32, pass: &QuoteResult, term: u32) -> PremiumRow {
        let paying = year <= term;
        let level = |amount: Amount| if paying { amount } else { 0 };

        let mut row = PremiumRow::new(year, attained_age);
        row.main_premium = level(pass.summary.base_main);
        row.extra_premium = level(pass.summary.extra);
        row.rider_premium = saturating_sum(pass.persons.iter().map(|p| p.riders_total()));
        row.waiver_premium = level(pass.waiver.as_ref().map(|w| w.premium).unwrap_or(0));
        row.total = saturating_sum([row.main_premium, row.extra_premium, row.rider_premium, row.waiver_premium]);
        row
    }
}
