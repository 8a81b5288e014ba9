//! Premium calculation for one quote pass
//!
//! The pass runs in two phases. The main premium is computed first; riders,
//! the waiver and the aggregation then take it as an explicit input.

mod rating;
mod main_product;
mod riders;
mod allocator;
mod waiver;
mod results;
mod aggregation;
mod frequency;
mod engine;

pub use rating::{CalcMode, RatingContext};
pub use main_product::premium_range;
pub use riders::available_tiers;
pub use allocator::HospitalCashAllocator;
pub use waiver::{waiver_base, WaiverPremium};
pub use results::{PremiumLedger, PremiumResult, QuoteResult, QuoteSummary};
pub use aggregation::aggregate;
pub use frequency::{prorate, FrequencyBreakdown};
pub use engine::QuoteEngine;
