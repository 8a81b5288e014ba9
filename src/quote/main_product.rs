//! Main product premium

use log::debug;

use super::RatingContext;
use crate::assumptions::{AmountRange, ProductRules, RateSource};
use crate::error::CalcError;
use crate::money::{floor_thousand, per_mille, Amount};
use crate::policy::{MainProduct, MainSelection, PersonProfile, Pricing};

/// Accepted annual premium range of a flexible-premium product
///
/// Derived from the age-band factor range and the universal premium floor.
/// `None` when no factor band covers the age.
pub fn premium_range<R: RateSource>(
    rates: &R,
    rules: &ProductRules,
    age: u32,
    sum_insured: Amount,
) -> Option<AmountRange> {
    let factors = rates.premium_factors(age)?;
    let si = sum_insured as f64;
    let low = (si / factors.max_factor).ceil() as Amount;
    let high = (si / factors.min_factor).floor() as Amount;
    Some(AmountRange {
        min: low.max(rules.flexible_premium_floor),
        max: high,
    })
}

impl<'a, R: RateSource> RatingContext<'a, R> {
    /// Annual main base premium, floored to 1,000
    pub fn main_premium(&self, person: &PersonProfile, selection: &MainSelection) -> Result<Amount, CalcError> {
        let product = selection.product;
        let premium = match product.pricing() {
            Pricing::PremiumDriven => self.checked_entered_premium(person, selection)?,
            Pricing::Rated => {
                let (term_key, sum_insured) = match product {
                    MainProduct::TermChoice => match selection.term_option {
                        Some(term) => (term, selection.sum_insured),
                        // Nothing to rate until a term is picked
                        None => return Ok(0),
                    },
                    MainProduct::FixedBenefitTerm => (0, self.rules.fixed_benefit_sum_insured),
                    _ => (0, selection.sum_insured),
                };
                match self.rates.main_rate(product, term_key, person.age, person.gender) {
                    Some(rate) => per_mille(rate, sum_insured),
                    None => self.missing_rate(product.as_str(), person.age)?,
                }
            }
        };
        debug!("{}: main {} premium {}", person.id, product.as_str(), premium);
        Ok(premium)
    }

    fn checked_entered_premium(&self, person: &PersonProfile, selection: &MainSelection) -> Result<Amount, CalcError> {
        let entered = selection.entered_premium;
        match premium_range(self.rates, self.rules, person.age, selection.sum_insured) {
            Some(range) if !range.contains(entered) => Err(CalcError::out_of_range(
                "main.entered_premium",
                entered,
                range.min,
                range.max,
            )),
            Some(_) => Ok(floor_thousand(entered as f64)),
            None if self.is_current() => Err(CalcError::missing_rate("premium_factors", person.age)),
            None => Ok(floor_thousand(entered as f64)),
        }
    }
}
