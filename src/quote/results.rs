//! Per-person premium results and quote summaries

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{FrequencyBreakdown, WaiverPremium};
use crate::money::{saturating_sum, Amount};
use crate::policy::{HealthProgram, InsuredPerson, RiderKind};

/// Annual premiums of one insured person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumResult {
    pub person_id: String,
    pub is_main: bool,

    /// Main base premium (main person only)
    pub main_base: Amount,

    /// Extra premium (main person only)
    pub extra: Amount,

    /// Rider premiums, waiver excluded
    pub riders: BTreeMap<RiderKind, Amount>,

    /// Waiver premium when this person is the waiver assignee
    pub waiver: Amount,

    pub total: Amount,
}

impl PremiumResult {
    pub fn new(person: &InsuredPerson, main_base: Amount, extra: Amount, riders: BTreeMap<RiderKind, Amount>) -> Self {
        let (main_base, extra) = if person.is_main { (main_base, extra) } else { (0, 0) };
        let mut result = Self {
            person_id: person.id().to_string(),
            is_main: person.is_main,
            main_base,
            extra,
            riders,
            waiver: 0,
            total: 0,
        };
        result.total = result.computed_total();
        result
    }

    /// Sum of rider premiums excluding the waiver
    pub fn riders_total(&self) -> Amount {
        saturating_sum(self.riders.values().copied())
    }

    pub fn computed_total(&self) -> Amount {
        saturating_sum([self.main_base, self.extra, self.riders_total(), self.waiver])
    }
}

/// Premium results keyed by person, in rating order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PremiumLedger {
    results: Vec<PremiumResult>,
}

impl PremiumLedger {
    pub fn new(results: Vec<PremiumResult>) -> Self {
        Self { results }
    }

    pub fn get(&self, person_id: &str) -> Option<&PremiumResult> {
        self.results.iter().find(|r| r.person_id == person_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PremiumResult> {
        self.results.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PremiumResult> {
        self.results.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Person totals keyed by id, for hosts that cache premiums per person
    pub fn totals_by_person(&self) -> BTreeMap<String, Amount> {
        self.results
            .iter()
            .map(|r| (r.person_id.clone(), r.total))
            .collect()
    }
}

/// Grand-total summary of a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub base_main: Amount,
    pub extra: Amount,
    /// All rider premiums including the waiver
    pub total_riders: Amount,
    pub total: Amount,
}

impl QuoteSummary {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Complete output of a successful pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub persons: PremiumLedger,
    pub waiver: Option<WaiverPremium>,
    pub summary: QuoteSummary,
    pub frequency: FrequencyBreakdown,

    /// Policy-wide hospital-cash cap and the part allocated
    pub hospital_cash_cap: Amount,
    pub hospital_cash_allocated: Amount,

    /// Health programs unlocked by the main premium
    pub available_tiers: Vec<HealthProgram>,
}
