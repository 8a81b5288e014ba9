//! Quote input structures matching the form snapshot handed over by the host

use serde::{Deserialize, Serialize};

use crate::money::Amount;

/// Gender of an insured person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "Male", alias = "Nam")]
    Male,
    #[serde(alias = "Female", alias = "Nữ")]
    Female,
}

/// How often premiums are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Annual,
    #[serde(alias = "semiannual")]
    SemiAnnual,
    Quarterly,
}

impl PaymentFrequency {
    /// Number of installments per policy year
    pub fn periods(&self) -> u32 {
        match self {
            PaymentFrequency::Annual => 1,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Quarterly => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Annual => "annual",
            PaymentFrequency::SemiAnnual => "semi_annual",
            PaymentFrequency::Quarterly => "quarterly",
        }
    }
}

/// Closed set of main products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainProduct {
    /// Flexible-premium universal life, premium paid for life
    #[serde(alias = "PUL_TRON_DOI")]
    PulWholeLife,
    /// Flexible-premium universal life, 15-year premium commitment
    #[serde(rename = "pul_15_year", alias = "PUL_15_NAM")]
    Pul15Year,
    /// Flexible-premium universal life, 5-year premium commitment
    #[serde(rename = "pul_5_year", alias = "PUL_5_NAM")]
    Pul5Year,
    /// Rated whole-life cover
    #[serde(alias = "KHOE_BINH_AN")]
    WholeLife,
    /// Rated whole-life cover with a limited payment period
    #[serde(alias = "VUNG_TUONG_LAI")]
    LimitedPay,
    /// Term cover with a fixed, non-negotiable sum insured
    #[serde(alias = "TRON_TAM_AN")]
    FixedBenefitTerm,
    /// Term cover whose term is picked from a menu
    #[serde(alias = "AN_BINH_UU_VIET")]
    TermChoice,
}

/// How the main premium is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pricing {
    /// Rate per mille of sum insured
    Rated,
    /// Caller enters the premium; the calculator only checks it
    PremiumDriven,
}

impl MainProduct {
    pub const ALL: [MainProduct; 7] = [
        MainProduct::PulWholeLife,
        MainProduct::Pul15Year,
        MainProduct::Pul5Year,
        MainProduct::WholeLife,
        MainProduct::LimitedPay,
        MainProduct::FixedBenefitTerm,
        MainProduct::TermChoice,
    ];

    pub fn pricing(&self) -> Pricing {
        match self {
            MainProduct::PulWholeLife | MainProduct::Pul15Year | MainProduct::Pul5Year => {
                Pricing::PremiumDriven
            }
            _ => Pricing::Rated,
        }
    }

    pub fn is_premium_driven(&self) -> bool {
        self.pricing() == Pricing::PremiumDriven
    }

    /// Key used in the main rate table
    pub fn as_str(&self) -> &'static str {
        match self {
            MainProduct::PulWholeLife => "pul_whole_life",
            MainProduct::Pul15Year => "pul_15_year",
            MainProduct::Pul5Year => "pul_5_year",
            MainProduct::WholeLife => "whole_life",
            MainProduct::LimitedPay => "limited_pay",
            MainProduct::FixedBenefitTerm => "fixed_benefit_term",
            MainProduct::TermChoice => "term_choice",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == key)
    }
}

/// Main policy selection for the whole quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainSelection {
    pub product: MainProduct,

    /// Sum insured (ignored by the fixed-benefit term product)
    #[serde(default)]
    pub sum_insured: Amount,

    /// Annual premium typed by the caller, premium-driven products only
    #[serde(default)]
    pub entered_premium: Amount,

    /// Payment term in years
    #[serde(default)]
    pub payment_term: u32,

    /// Top-up premium on the main person
    #[serde(default)]
    pub extra_premium: Amount,

    /// Chosen term for the term-choice product
    #[serde(default)]
    pub term_option: Option<u32>,
}

/// Health-care rider program, ordered from cheapest to richest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthProgram {
    Basic,
    Advanced,
    Comprehensive,
    Premier,
}

impl HealthProgram {
    pub const ALL: [HealthProgram; 4] = [
        HealthProgram::Basic,
        HealthProgram::Advanced,
        HealthProgram::Comprehensive,
        HealthProgram::Premier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthProgram::Basic => "basic",
            HealthProgram::Advanced => "advanced",
            HealthProgram::Comprehensive => "comprehensive",
            HealthProgram::Premier => "premier",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == key)
    }
}

/// Geographic scope of the health rider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthScope {
    #[default]
    Domestic,
    International,
}

impl HealthScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthScope::Domestic => "domestic",
            HealthScope::International => "international",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "domestic" => Some(HealthScope::Domestic),
            "international" => Some(HealthScope::International),
            _ => None,
        }
    }
}

/// Optional add-on covers of the health rider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthAddon {
    Outpatient,
    Dental,
}

impl HealthAddon {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthAddon::Outpatient => "outpatient",
            HealthAddon::Dental => "dental",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "outpatient" => Some(HealthAddon::Outpatient),
            "dental" => Some(HealthAddon::Dental),
            _ => None,
        }
    }
}

/// Rider kinds, in the order they are rated for a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiderKind {
    Health,
    CriticalIllness,
    Accident,
    HospitalCash,
}

impl RiderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiderKind::Health => "health",
            RiderKind::CriticalIllness => "critical_illness",
            RiderKind::Accident => "accident",
            RiderKind::HospitalCash => "hospital_cash",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSelection {
    pub program: HealthProgram,
    #[serde(default)]
    pub scope: HealthScope,
    #[serde(default)]
    pub outpatient: bool,
    #[serde(default)]
    pub dental: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SumInsuredSelection {
    pub sum_insured: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalCashSelection {
    pub daily_benefit: Amount,
}

/// Riders chosen for one person; `None` means not selected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiderSelections {
    #[serde(default)]
    pub health: Option<HealthSelection>,
    #[serde(default)]
    pub critical_illness: Option<SumInsuredSelection>,
    #[serde(default)]
    pub accident: Option<SumInsuredSelection>,
    #[serde(default)]
    pub hospital_cash: Option<HospitalCashSelection>,
}

impl RiderSelections {
    pub fn is_empty(&self) -> bool {
        self.health.is_none()
            && self.critical_illness.is_none()
            && self.accident.is_none()
            && self.hospital_cash.is_none()
    }
}

/// One insured person as typed into the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonInput {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Date of birth, `DD/MM/YYYY`
    #[serde(default)]
    pub dob: String,

    pub gender: Gender,

    /// Occupational risk group 1-4 (0 = not classified yet)
    #[serde(default)]
    pub risk_group: u8,

    /// Occupation name, resolved to a risk group when `risk_group` is 0
    #[serde(default)]
    pub occupation: Option<String>,

    #[serde(default)]
    pub riders: RiderSelections,
}

/// Assignee value naming a person outside the insured list
pub const OTHER_ASSIGNEE: &str = "other";

/// Premium-waiver rider choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverInput {
    /// Id of a listed person, or `"other"`
    pub assignee: String,

    /// Required when `assignee` is `"other"`
    #[serde(default)]
    pub other_person: Option<PersonInput>,
}

/// Whole form snapshot for one calculation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyInput {
    pub main_person: PersonInput,

    #[serde(default)]
    pub supplementary: Vec<PersonInput>,

    pub main: MainSelection,

    #[serde(default)]
    pub frequency: PaymentFrequency,

    #[serde(default)]
    pub waiver: Option<WaiverInput>,

    /// Age of the main person up to which premiums are illustrated
    #[serde(default)]
    pub target_age: Option<u32>,
}

impl PolicyInput {
    /// Main person first, then supplementary persons in list order
    pub fn persons(&self) -> impl Iterator<Item = &PersonInput> {
        std::iter::once(&self.main_person).chain(self.supplementary.iter())
    }
}
