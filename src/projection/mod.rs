//! Year-by-year premium illustration for a quoted policy

mod engine;
mod cashflows;

pub use engine::ProjectionEngine;
pub use cashflows::{PremiumRow, ProjectionResult, ProjectionSummary};
