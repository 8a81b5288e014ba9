//! Currency amounts and the rounding rules used by every calculator
//!
//! All premiums are whole currency units, rounded to a multiple of 1,000.

/// Whole currency units
pub type Amount = u64;

/// Rounding unit for every premium amount
pub const ROUNDING_UNIT: Amount = 1_000;

/// Absorbs binary float noise such as 349_999.99999999994
const EPSILON: f64 = 1e-6;

/// Floor a raw premium to the nearest 1,000 below
pub fn floor_thousand(raw: f64) -> Amount {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    let units = ((raw + EPSILON) / ROUNDING_UNIT as f64).floor();
    units as Amount * ROUNDING_UNIT
}

/// Round a raw premium to the nearest 1,000 (half away from zero)
pub fn round_thousand(raw: f64) -> Amount {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    let units = (raw / ROUNDING_UNIT as f64 + EPSILON).round();
    units as Amount * ROUNDING_UNIT
}

/// Raise a raw amount to the nearest 1,000 above
pub fn ceil_thousand(raw: f64) -> Amount {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    let units = ((raw - EPSILON) / ROUNDING_UNIT as f64).ceil();
    units as Amount * ROUNDING_UNIT
}

/// Sum of amounts, capped at `Amount::MAX`
pub fn saturating_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Amount {
    amounts.into_iter().fold(0, Amount::saturating_add)
}

/// Premium rated per mille of a sum insured, floored to 1,000
pub fn per_mille(rate: f64, sum_insured: Amount) -> Amount {
    floor_thousand(rate * sum_insured as f64 / 1000.0)
}
