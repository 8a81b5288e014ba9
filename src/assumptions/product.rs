//! Product rules: age windows, bounds, thresholds and loading factors
//!
//! These are policy parameters rather than rates. Defaults carry the values the
//! quote tool is calibrated to; a JSON file can override any subset of them.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::money::Amount;
use crate::policy::{HealthProgram, MainProduct, MainSelection, PaymentFrequency, PersonProfile};
use crate::quote::CalcMode;

/// Age window a person must fall in to hold a cover
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeWindow {
    /// Minimum days since birth
    #[serde(default)]
    pub min_days: i64,
    /// Minimum completed years
    #[serde(default)]
    pub min_age: u32,
    /// Oldest age at which the cover can be taken out
    pub max_entry_age: u32,
    /// Oldest age at which the cover is still renewed
    pub max_renewal_age: u32,
}

impl AgeWindow {
    pub const fn new(min_days: i64, min_age: u32, max_entry_age: u32, max_renewal_age: u32) -> Self {
        Self {
            min_days,
            min_age,
            max_entry_age,
            max_renewal_age,
        }
    }

    pub fn meets_floor(&self, profile: &PersonProfile) -> bool {
        profile.days_since_birth >= self.min_days && profile.age >= self.min_age
    }

    /// Whether the person can hold the cover in the given mode
    pub fn admits(&self, profile: &PersonProfile, mode: CalcMode) -> bool {
        let ceiling = match mode {
            CalcMode::Current => self.max_entry_age,
            CalcMode::Projected => self.max_renewal_age,
        };
        self.meets_floor(profile) && profile.age <= ceiling
    }
}

/// Inclusive amount range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: Amount,
    pub max: Amount,
}

impl AmountRange {
    pub fn contains(&self, value: Amount) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Loading applied to rider premiums for more frequent collection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyLoading {
    pub semi_annual: f64,
    pub quarterly: f64,
}

impl Default for FrequencyLoading {
    fn default() -> Self {
        Self {
            semi_annual: 1.02,
            quarterly: 1.04,
        }
    }
}

impl FrequencyLoading {
    pub fn factor(&self, frequency: PaymentFrequency) -> f64 {
        match frequency {
            PaymentFrequency::Annual => 1.0,
            PaymentFrequency::SemiAnnual => self.semi_annual,
            PaymentFrequency::Quarterly => self.quarterly,
        }
    }
}

/// Main premium needed to unlock each health program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTierRules {
    pub advanced_from: Amount,
    pub comprehensive_from: Amount,
    pub premier_from: Amount,
}

impl Default for HealthTierRules {
    fn default() -> Self {
        Self {
            advanced_from: 5_000_000,
            comprehensive_from: 10_000_000,
            premier_from: 15_000_000,
        }
    }
}

impl HealthTierRules {
    /// Programs unlocked by a main premium; the basic program is always offered
    pub fn available(&self, main_premium: Amount) -> BTreeSet<HealthProgram> {
        let mut tiers = BTreeSet::from([HealthProgram::Basic]);
        if main_premium >= self.advanced_from {
            tiers.insert(HealthProgram::Advanced);
        }
        if main_premium >= self.comprehensive_from {
            tiers.insert(HealthProgram::Comprehensive);
        }
        if main_premium >= self.premier_from {
            tiers.insert(HealthProgram::Premier);
        }
        tiers
    }
}

/// Hospital-cash benefit limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HospitalCashRules {
    /// Main premium per cap unit
    pub cap_divisor: Amount,
    /// Daily benefit granted per whole divisor of main premium
    pub cap_unit: Amount,
    /// Daily benefit must be a multiple of this
    pub benefit_step: Amount,
    pub min_daily_benefit: Amount,
    /// Persons younger than this get the child ceiling
    pub adult_age: u32,
    pub child_ceiling: Amount,
    pub adult_ceiling: Amount,
}

impl Default for HospitalCashRules {
    fn default() -> Self {
        Self {
            cap_divisor: 4_000_000,
            cap_unit: 100_000,
            benefit_step: 50_000,
            min_daily_benefit: 100_000,
            adult_age: 18,
            child_ceiling: 300_000,
            adult_ceiling: 1_000_000,
        }
    }
}

impl HospitalCashRules {
    /// Policy-wide daily benefit ceiling shared by every person
    pub fn policy_cap(&self, main_premium: Amount) -> Amount {
        if self.cap_divisor == 0 {
            return 0;
        }
        (main_premium / self.cap_divisor).saturating_mul(self.cap_unit)
    }

    pub fn person_ceiling(&self, age: u32) -> Amount {
        if age < self.adult_age {
            self.child_ceiling
        } else {
            self.adult_ceiling
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccidentRules {
    pub sum_insured: AmountRange,
    /// Highest insurable risk group
    pub max_risk_group: u8,
}

impl Default for AccidentRules {
    fn default() -> Self {
        Self {
            sum_insured: AmountRange {
                min: 10_000_000,
                max: 8_000_000_000,
            },
            max_risk_group: 4,
        }
    }
}

/// Age windows for every rider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiderWindows {
    pub health: AgeWindow,
    pub critical_illness: AgeWindow,
    pub accident: AgeWindow,
    pub hospital_cash: AgeWindow,
    pub waiver: AgeWindow,
}

impl Default for RiderWindows {
    fn default() -> Self {
        Self {
            health: AgeWindow::new(30, 0, 65, 74),
            critical_illness: AgeWindow::new(30, 0, 70, 85),
            accident: AgeWindow::new(0, 18, 64, 64),
            hospital_cash: AgeWindow::new(30, 0, 55, 59),
            waiver: AgeWindow::new(0, 18, 60, 60),
        }
    }
}

/// Terms of one main product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductTerms {
    pub entry: AgeWindow,
    pub min_sum_insured: Amount,
    pub min_payment_term: u32,
    /// Products whose payment term is not chosen freely
    #[serde(default)]
    pub fixed_term: Option<u32>,
}

impl ProductTerms {
    pub fn default_for(product: MainProduct) -> Self {
        let standard = AgeWindow::new(30, 0, 70, 99);
        let (entry, min_payment_term, fixed_term) = match product {
            MainProduct::PulWholeLife => (standard, 4, None),
            MainProduct::Pul15Year => (standard, 15, None),
            MainProduct::Pul5Year => (standard, 5, None),
            MainProduct::WholeLife => (standard, 10, None),
            MainProduct::LimitedPay => (standard, 5, None),
            MainProduct::FixedBenefitTerm => (AgeWindow::new(0, 12, 60, 70), 10, Some(10)),
            MainProduct::TermChoice => (AgeWindow::new(0, 18, 65, 80), 5, None),
        };
        Self {
            entry,
            min_sum_insured: 100_000_000,
            min_payment_term,
            fixed_term,
        }
    }
}

/// One entry of the term-choice menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermOption {
    pub years: u32,
    /// Oldest age at which this term is offered
    pub max_age: u32,
}

/// All policy parameters the calculators and validators consult
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRules {
    pub loading: FrequencyLoading,
    pub health_tiers: HealthTierRules,
    pub hospital_cash: HospitalCashRules,
    pub critical_illness: AmountRange,
    pub accident: AccidentRules,
    pub windows: RiderWindows,
    pub products: BTreeMap<MainProduct, ProductTerms>,
    pub term_menu: Vec<TermOption>,
    /// Sum insured of the fixed-benefit term product, whatever the caller typed
    pub fixed_benefit_sum_insured: Amount,
    /// Minimum annual premium of flexible-premium products
    pub flexible_premium_floor: Amount,
    /// Extra premium may not exceed this multiple of the main base premium
    pub extra_premium_multiple: Amount,
    /// Age at which every cover ends
    pub max_coverage_age: u32,
}

impl Default for ProductRules {
    fn default() -> Self {
        Self {
            loading: FrequencyLoading::default(),
            health_tiers: HealthTierRules::default(),
            hospital_cash: HospitalCashRules::default(),
            critical_illness: AmountRange {
                min: 200_000_000,
                max: 5_000_000_000,
            },
            accident: AccidentRules::default(),
            windows: RiderWindows::default(),
            products: MainProduct::ALL
                .iter()
                .map(|&p| (p, ProductTerms::default_for(p)))
                .collect(),
            term_menu: vec![
                TermOption { years: 5, max_age: 65 },
                TermOption { years: 10, max_age: 65 },
                TermOption { years: 15, max_age: 55 },
            ],
            fixed_benefit_sum_insured: 100_000_000,
            flexible_premium_floor: 5_000_000,
            extra_premium_multiple: 5,
            max_coverage_age: 100,
        }
    }
}

impl ProductRules {
    /// Load rules from a JSON file; omitted fields keep their defaults
    pub fn from_json_path(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn product(&self, product: MainProduct) -> ProductTerms {
        self.products
            .get(&product)
            .copied()
            .unwrap_or_else(|| ProductTerms::default_for(product))
    }

    /// Term-choice menu offered at an age
    pub fn term_options(&self, age: u32) -> Vec<u32> {
        self.term_menu
            .iter()
            .filter(|o| age <= o.max_age)
            .map(|o| o.years)
            .collect()
    }

    /// Years the main premium is paid for a selection
    pub fn payment_term(&self, selection: &MainSelection) -> u32 {
        match (self.product(selection.product).fixed_term, selection.product) {
            (Some(term), _) => term,
            (None, MainProduct::TermChoice) => selection.term_option.unwrap_or(0),
            (None, _) => selection.payment_term,
        }
    }

    /// Longest payment term allowed at an age
    pub fn max_payment_term(&self, age: u32) -> u32 {
        self.max_coverage_age.saturating_sub(age + 1)
    }
}
