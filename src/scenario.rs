//! Scenario runner for quote passes
//!
//! Pre-loads rate tables and rules once, then runs any number of independent
//! passes against them: normalize, calculate, validate and prorate.

use std::path::Path;

use chrono::NaiveDate;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::assumptions::Assumptions;
use crate::error::{CalcError, DataError};
use crate::money::Amount;
use crate::policy::{resolve_occupations, PolicyInput, PolicyState};
use crate::projection::{ProjectionEngine, ProjectionResult};
use crate::quote::{QuoteEngine, QuoteResult, QuoteSummary};
use crate::validation::{ValidationEngine, ValidationOutcome};

/// Result of one pass: the quote or the fatal error that stopped it, plus
/// every validation problem found regardless
#[derive(Debug)]
pub struct QuoteOutcome {
    pub result: Result<QuoteResult, CalcError>,
    pub validation: Vec<ValidationOutcome>,
}

impl QuoteOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_valid(&self) -> bool {
        self.result.is_ok() && self.validation.is_empty()
    }

    /// Summary to display, all zeros with the error message when the pass failed
    pub fn summary_or_zero(&self) -> (QuoteSummary, Option<String>) {
        match &self.result {
            Ok(quote) => (quote.summary, None),
            Err(e) => (QuoteSummary::zero(), Some(e.to_string())),
        }
    }

    /// Serializable view for output
    pub fn report(&self) -> QuoteReport {
        let (summary, error) = self.summary_or_zero();
        QuoteReport {
            summary,
            error,
            quote: self.result.as_ref().ok().cloned(),
            validation: self.validation.clone(),
        }
    }
}

/// Output form of a [`QuoteOutcome`]
#[derive(Debug, Clone, Serialize)]
pub struct QuoteReport {
    pub summary: QuoteSummary,
    pub error: Option<String>,
    pub quote: Option<QuoteResult>,
    pub validation: Vec<ValidationOutcome>,
}

/// Pre-loaded runner for quote passes
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::bundled()?;
/// let outcome = runner.run(&input, reference);
/// let (summary, error) = outcome.summary_or_zero();
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    assumptions: Assumptions,
}

impl ScenarioRunner {
    /// Runner over the bundled rate tables and default rules
    pub fn bundled() -> Result<Self, DataError> {
        Ok(Self {
            assumptions: Assumptions::bundled()?,
        })
    }

    /// Load tables from CSV files in the default location
    pub fn from_csv() -> Result<Self, DataError> {
        Ok(Self {
            assumptions: Assumptions::from_csv()?,
        })
    }

    /// Load tables from a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        Ok(Self {
            assumptions: Assumptions::from_csv_path(path)?,
        })
    }

    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn assumptions_mut(&mut self) -> &mut Assumptions {
        &mut self.assumptions
    }

    fn prepare(&self, input: &PolicyInput) -> PolicyInput {
        let mut input = input.clone();
        resolve_occupations(&mut input, &self.assumptions.occupations);
        input
    }

    /// Run one full pass
    pub fn run(&self, input: &PolicyInput, reference: NaiveDate) -> QuoteOutcome {
        let input = self.prepare(input);
        let engine = QuoteEngine::new(&self.assumptions.rates, &self.assumptions.rules);

        let (result, main_premium) = match PolicyState::from_input(&input, reference) {
            Ok(state) => {
                let main_premium: Option<Amount> = engine.main_premium(&state).ok();
                (engine.quote(&state), main_premium)
            }
            Err(e) => (Err(e), None),
        };

        let validation = ValidationEngine::new(&self.assumptions.rates, &self.assumptions.rules)
            .validate(&input, reference, main_premium);

        match &result {
            Ok(quote) => info!(
                "pass for {}: total {}, {} validation problem(s)",
                input.main_person.id,
                quote.summary.total,
                validation.len()
            ),
            Err(e) => warn!("pass for {} failed, showing zero totals: {}", input.main_person.id, e),
        }

        QuoteOutcome { result, validation }
    }

    /// Run independent passes in parallel; outcomes keep the input order
    pub fn run_batch(&self, inputs: &[PolicyInput], reference: NaiveDate) -> Vec<QuoteOutcome> {
        inputs.par_iter().map(|input| self.run(input, reference)).collect()
    }

    /// Premium illustration from issue to `target_age`
    pub fn project(
        &self,
        input: &PolicyInput,
        reference: NaiveDate,
        target_age: Option<u32>,
    ) -> Result<ProjectionResult, CalcError> {
        let input = self.prepare(input);
        let state = PolicyState::from_input(&input, reference)?;
        ProjectionEngine::new(&self.assumptions.rates, &self.assumptions.rules).project(&state, target_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::load_policy_input_from_reader;

    const SNAPSHOT: &str = r#"{
        "main_person": {
            "id": "main", "name": "Minh", "dob": "01/01/1996", "gender": "male", "occupation": "Accountant",
            "riders": {"critical_illness": {"sum_insured": 300000000}, "accident": {"sum_insured": 100000000}}
        },
        "supplementary": [
            {"id": "kid", "name": "Lan", "dob": "15/03/2019", "gender": "female",
             "riders": {"health": {"program": "basic"}}}
        ],
        "main": {"product": "whole_life", "sum_insured": 500000000, "payment_term": 20},
        "frequency": "quarterly",
        "waiver": {"assignee": "main"}
    }"#;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn snapshot() -> PolicyInput {
        load_policy_input_from_reader(SNAPSHOT.as_bytes()).unwrap()
    }

    #[test]
    fn test_full_pass() {
        let runner = ScenarioRunner::bundled().unwrap();
        let outcome = runner.run(&snapshot(), reference());
        assert!(outcome.is_valid(), "{:?}", outcome.validation);

        let quote = outcome.result.as_ref().unwrap();
        let main = quote.persons.get("main").unwrap();
        assert_eq!(main.main_base, 2_000_000);
        // Occupation resolves to risk group 1: 1.0 per mille of 100,000,000
        assert_eq!(main.riders[&crate::policy::RiderKind::Accident], 100_000);
        assert!(quote.waiver.as_ref().unwrap().premium > 0);
        assert_eq!(
            quote.summary.total,
            quote.summary.base_main + quote.summary.extra + quote.summary.total_riders
        );
        assert_eq!(quote.frequency.periods, 4);
    }

    #[test]
    fn test_failed_pass_falls_back_to_zero() {
        let runner = ScenarioRunner::bundled().unwrap();
        let mut input = snapshot();
        input.supplementary[0].dob = "2019-03-15".into();

        let outcome = runner.run(&input, reference());
        assert!(!outcome.is_ok());
        let (summary, error) = outcome.summary_or_zero();
        assert_eq!(summary, QuoteSummary::zero());
        assert!(error.unwrap().contains("2019-03-15"));

        let report = outcome.report();
        assert!(report.quote.is_none());
        assert!(serde_json::to_string(&report).is_ok());
    }

    #[test]
    fn test_validation_alongside_amounts() {
        let runner = ScenarioRunner::bundled().unwrap();
        let mut input = snapshot();
        input.main.extra_premium = 20_000_000;

        let outcome = runner.run(&input, reference());
        assert!(outcome.is_ok());
        assert_eq!(outcome.validation.len(), 1);
        assert_eq!(outcome.validation[0].field, "main.extra_premium");
    }

    #[test]
    fn test_batch_keeps_order() {
        let runner = ScenarioRunner::bundled().unwrap();
        let mut bigger = snapshot();
        bigger.main.sum_insured = 1_000_000_000;
        let mut broken = snapshot();
        broken.main_person.dob = "31/02/1996".into();

        let outcomes = runner.run_batch(&[snapshot(), bigger, broken], reference());
        assert_eq!(outcomes.len(), 3);
        let mains: Vec<_> = outcomes
            .iter()
            .map(|o| o.summary_or_zero().0.base_main)
            .collect();
        assert_eq!(mains, vec![2_000_000, 4_000_000, 0]);
    }

    #[test]
    fn test_projection() {
        let runner = ScenarioRunner::bundled().unwrap();
        let result = runner.project(&snapshot(), reference(), Some(35)).unwrap();
        assert_eq!(result.rows.len(), 6);
        assert_eq!(result.rows[0].attained_age, 30);
        assert!(result.rows.iter().all(|r| r.main_premium == 2_000_000));
    }

    #[test]
    fn test_repeated_person_id_stops_the_pass() {
        let runner = ScenarioRunner::bundled().unwrap();
        let mut input = snapshot();
        input.supplementary[0].id = "main".into();

        let outcome = runner.run(&input, reference());
        assert!(matches!(outcome.result, Err(CalcError::DuplicatePerson { .. })));
        assert_eq!(outcome.summary_or_zero().0, QuoteSummary::zero());
        assert!(outcome.validation.iter().any(|o| o.field == "main.id"));
    }

    #[test]
    fn test_oversized_term_and_extra_are_reported() {
        let runner = ScenarioRunner::bundled().unwrap();
        let mut input = snapshot();
        input.main.payment_term = u32::MAX;
        input.main.extra_premium = u64::MAX;
        input.target_age = Some(60);

        let outcome = runner.run(&input, reference());
        assert!(outcome.is_ok());
        assert_eq!(outcome.summary_or_zero().0.total, u64::MAX);
        let fields: Vec<_> = outcome.validation.iter().map(|o| o.field.as_str()).collect();
        assert_eq!(fields, vec!["main.extra_premium", "main.payment_term", "target_age"]);
    }
}
