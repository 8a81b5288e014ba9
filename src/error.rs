//! Error types for quote calculation and rate-table loading
//!
//! Fatal calculation errors abort the whole pass. Non-fatal problems are
//! reported as [`crate::validation::ValidationOutcome`] entries instead.

use thiserror::Error;

use crate::money::Amount;

/// Errors raised while loading rate tables, rules or snapshots
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{file}: malformed row: {detail}")]
    MalformedRow { file: String, detail: String },

    #[error("{file}: age band [{min}, {max}] overlaps an earlier band")]
    OverlappingBand { file: String, min: u32, max: u32 },
}

/// Fatal errors for a calculation pass
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("invalid date of birth '{input}' (expected DD/MM/YYYY, not in the future)")]
    InvalidDate { input: String },

    #[error("no rate in table '{table}' for age {age}")]
    MissingRate { table: String, age: u32 },

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: Amount,
        min: Amount,
        max: Amount,
    },

    #[error("waiver assignee aged {age} is outside the insurable window")]
    IneligibleAssignee { age: u32 },

    #[error("person id '{id}' is used more than once or is reserved")]
    DuplicatePerson { id: String },

    #[error("waiver assignee '{id}' is not a listed person")]
    UnknownAssignee { id: String },

    #[error("hospital cash for {person}: {requested}/day exceeds the remaining policy allowance of {remaining}/day")]
    HospitalCapExceeded {
        person: String,
        requested: Amount,
        remaining: Amount,
    },

    #[error(transparent)]
    Data(#[from] DataError),
}

impl CalcError {
    pub fn out_of_range(field: impl Into<String>, value: Amount, min: Amount, max: Amount) -> Self {
        CalcError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        }
    }

    pub fn missing_rate(table: impl Into<String>, age: u32) -> Self {
        CalcError::MissingRate {
            table: table.into(),
            age,
        }
    }
}
