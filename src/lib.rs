//! Premium Quote - premium calculation and eligibility engine for multi-insured life quotes
//!
//! This library provides:
//! - Main product premiums, rated or premium-driven
//! - Health, critical-illness, accident and hospital-cash riders per person
//! - A premium-waiver rider rated on the rest of the policy
//! - Frequency proration with loading, and non-fatal validation
//! - Year-by-year premium illustrations

pub mod error;
pub mod money;
pub mod policy;
pub mod assumptions;
pub mod quote;
pub mod validation;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{CalcError, DataError};
pub use money::Amount;
pub use policy::{PolicyInput, PolicyState};
pub use assumptions::{Assumptions, ProductRules, RateSource, RateTables};
pub use quote::{CalcMode, QuoteEngine, QuoteResult, QuoteSummary};
pub use validation::{ValidationEngine, ValidationOutcome};
pub use projection::{ProjectionEngine, ProjectionResult};
pub use scenario::{QuoteOutcome, ScenarioRunner};
