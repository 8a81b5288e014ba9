//! Person normalization: birth date text to attained age

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Gender, PersonInput};
use crate::error::CalcError;

/// Textual birth-date format accepted at the input boundary
pub const DOB_FORMAT: &str = "%d/%m/%Y";

/// Normalized person, immutable for one calculation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonProfile {
    pub id: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub risk_group: u8,

    /// Completed years at the reference date
    pub age: u32,

    /// Days elapsed since birth at the reference date
    pub days_since_birth: i64,
}

impl PersonProfile {
    /// Normalize a form entry against `reference`
    pub fn from_input(input: &PersonInput, reference: NaiveDate) -> Result<Self, CalcError> {
        let birth_date = parse_birth_date(&input.dob, reference)?;
        Ok(Self {
            id: input.id.clone(),
            name: input.name.trim().to_string(),
            birth_date,
            gender: input.gender,
            risk_group: input.risk_group,
            age: age_on(birth_date, reference),
            days_since_birth: (reference - birth_date).num_days(),
        })
    }

    /// Same person `years` policy years later
    pub fn aged(&self, years: u32) -> Self {
        Self {
            age: self.age + years,
            days_since_birth: self.days_since_birth + 365 * years as i64,
            ..self.clone()
        }
    }
}

/// Parse a `DD/MM/YYYY` birth date that is not after `reference`
pub fn parse_birth_date(input: &str, reference: NaiveDate) -> Result<NaiveDate, CalcError> {
    let invalid = || CalcError::InvalidDate {
        input: input.to_string(),
    };

    let text = input.trim();
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[2] == b'/'
        && bytes[5] == b'/'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
    if !shaped {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(text, DOB_FORMAT).map_err(|_| invalid())?;
    if date > reference {
        return Err(invalid());
    }
    Ok(date)
}

/// Calendar age: one less while the birthday has not come yet this year
pub fn age_on(birth_date: NaiveDate, reference: NaiveDate) -> u32 {
    let mut age = reference.year() - birth_date.year();
    if (reference.month(), reference.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0) as u32
}
