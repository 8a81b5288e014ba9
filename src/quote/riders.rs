//! Rider premiums: health, critical illness, accident and hospital cash
//!
//! Each rider is 0 when the person is outside its age window. Amounts are
//! annual and floored to 1,000.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::{HospitalCashAllocator, RatingContext};
use crate::assumptions::{ProductRules, RateSource};
use crate::error::CalcError;
use crate::money::{floor_thousand, per_mille, Amount};
use crate::policy::{
    HealthAddon, HealthProgram, HealthSelection, HospitalCashSelection, InsuredPerson, PersonProfile,
    RiderKind, SumInsuredSelection,
};

/// Health programs a main premium unlocks
///
/// Restricting the choice to this set is the form's job; the calculator
/// rates whatever program it is given.
pub fn available_tiers(rules: &ProductRules, main_premium: Amount) -> BTreeSet<HealthProgram> {
    rules.health_tiers.available(main_premium)
}

impl<'a, R: RateSource> RatingContext<'a, R> {
    pub fn health_premium(&self, person: &PersonProfile, selection: &HealthSelection) -> Result<Amount, CalcError> {
        if !self.rules.windows.health.admits(person, self.mode) {
            return Ok(0);
        }
        let program = selection.program;
        let Some(base) = self.rates.health_rate(program, selection.scope, person.age) else {
            return self.missing_rate("health", person.age);
        };

        let mut total = base;
        let addons = [
            (HealthAddon::Outpatient, selection.outpatient),
            (HealthAddon::Dental, selection.dental),
        ];
        for (addon, chosen) in addons {
            if !chosen {
                continue;
            }
            match self.rates.health_addon_rate(addon, program, person.age) {
                Some(rate) => total += rate,
                None => {
                    self.missing_rate(addon.as_str(), person.age)?;
                }
            }
        }
        Ok(floor_thousand(total))
    }

    pub fn critical_illness_premium(
        &self,
        person: &PersonProfile,
        selection: &SumInsuredSelection,
    ) -> Result<Amount, CalcError> {
        if !self.rules.windows.critical_illness.admits(person, self.mode) {
            return Ok(0);
        }
        let range = self.rules.critical_illness;
        if !range.contains(selection.sum_insured) {
            return Err(CalcError::out_of_range(
                format!("{}.critical_illness.sum_insured", person.id),
                selection.sum_insured,
                range.min,
                range.max,
            ));
        }
        match self.rates.critical_illness_rate(person.age, person.gender) {
            Some(rate) => Ok(per_mille(rate, selection.sum_insured)),
            None => self.missing_rate("critical_illness", person.age),
        }
    }

    pub fn accident_premium(&self, person: &PersonProfile, selection: &SumInsuredSelection) -> Result<Amount, CalcError> {
        if !self.rules.windows.accident.admits(person, self.mode) {
            return Ok(0);
        }
        let group = person.risk_group;
        if group == 0 || group > self.rules.accident.max_risk_group {
            return Ok(0);
        }
        let range = self.rules.accident.sum_insured;
        if !range.contains(selection.sum_insured) {
            return Err(CalcError::out_of_range(
                format!("{}.accident.sum_insured", person.id),
                selection.sum_insured,
                range.min,
                range.max,
            ));
        }
        match self.rates.accident_rate(group) {
            Some(rate) => Ok(per_mille(rate, selection.sum_insured)),
            None => self.missing_rate("accident", person.age),
        }
    }

    /// Hospital-cash premium; consumes part of the shared allowance
    pub fn hospital_cash_premium(
        &self,
        person: &PersonProfile,
        selection: &HospitalCashSelection,
        allocator: HospitalCashAllocator,
    ) -> Result<(Amount, HospitalCashAllocator), CalcError> {
        let daily = selection.daily_benefit;
        if daily == 0 || !self.rules.windows.hospital_cash.admits(person, self.mode) {
            return Ok((0, allocator));
        }

        // Allowances bind at issue; later policy years keep what was granted
        let allocator = if self.is_current() {
            let ceiling = self.rules.hospital_cash.person_ceiling(person.age);
            if daily > ceiling {
                return Err(CalcError::out_of_range(
                    format!("{}.hospital_cash.daily_benefit", person.id),
                    daily,
                    self.rules.hospital_cash.min_daily_benefit,
                    ceiling,
                ));
            }
            allocator.allocate(&person.id, daily)?
        } else {
            allocator
        };

        let premium = match self.rates.hospital_cash_rate(person.age) {
            Some(rate) => floor_thousand(rate * daily as f64 / 100.0),
            None => self.missing_rate("hospital_cash", person.age)?,
        };
        Ok((premium, allocator))
    }

    /// All rider premiums for one person, in rider order
    pub fn rider_premiums(
        &self,
        person: &InsuredPerson,
        allocator: HospitalCashAllocator,
    ) -> Result<(BTreeMap<RiderKind, Amount>, HospitalCashAllocator), CalcError> {
        let profile = &person.profile;
        let riders = &person.riders;
        let mut premiums = BTreeMap::new();

        if let Some(health) = &riders.health {
            premiums.insert(RiderKind::Health, self.health_premium(profile, health)?);
        }
        if let Some(ci) = &riders.critical_illness {
            premiums.insert(RiderKind::CriticalIllness, self.critical_illness_premium(profile, ci)?);
        }
        if let Some(accident) = &riders.accident {
            premiums.insert(RiderKind::Accident, self.accident_premium(profile, accident)?);
        }
        let allocator = match &riders.hospital_cash {
            Some(hospital) => {
                let (premium, allocator) = self.hospital_cash_premium(profile, hospital, allocator)?;
                premiums.insert(RiderKind::HospitalCash, premium);
                allocator
            }
            None => allocator,
        };

        debug!("{}: rider premiums {:?}", profile.id, premiums);
        Ok((premiums, allocator))
    }
}
