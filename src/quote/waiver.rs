//! Premium-waiver rider rated on everyone else's exposure

use log::debug;
use serde::{Deserialize, Serialize};

use super::{PremiumLedger, RatingContext};
use crate::assumptions::RateSource;
use crate::error::CalcError;
use crate::money::{per_mille, saturating_sum, Amount};
use crate::policy::{PolicyState, WaiverAssignee};

/// Waiver premium of a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiverPremium {
    /// Listed person carrying the waiver, `None` for an outside assignee
    pub person_id: Option<String>,
    pub base: Amount,
    pub premium: Amount,
}

/// Sum insured of the waiver
///
/// All main and rider premiums across the policy, minus the assignee's own
/// rider premiums when the assignee is a listed person.
pub fn waiver_base(assignee: &WaiverAssignee, ledger: &PremiumLedger) -> Amount {
    let exposure = saturating_sum(ledger.iter().map(|r| r.main_base.saturating_add(r.riders_total())));
    match assignee {
        WaiverAssignee::Listed(id) => {
            let own = ledger.get(id).map(|r| r.riders_total()).unwrap_or(0);
            exposure.saturating_sub(own)
        }
        WaiverAssignee::Other(_) => exposure,
    }
}

impl<'a, R: RateSource> RatingContext<'a, R> {
    /// Waiver premium, or `None` when no waiver was chosen
    pub fn waiver_premium(&self, state: &PolicyState, ledger: &PremiumLedger) -> Result<Option<WaiverPremium>, CalcError> {
        let Some(selection) = &state.waiver else {
            return Ok(None);
        };

        let (person_id, profile) = match &selection.assignee {
            WaiverAssignee::Listed(id) => {
                let person = state
                    .person(id)
                    .ok_or_else(|| CalcError::UnknownAssignee { id: id.clone() })?;
                (Some(id.clone()), &person.profile)
            }
            WaiverAssignee::Other(profile) => (None, profile),
        };

        let base = waiver_base(&selection.assignee, ledger);
        let premium = if !self.rules.windows.waiver.admits(profile, self.mode) {
            if self.is_current() {
                return Err(CalcError::IneligibleAssignee { age: profile.age });
            }
            0
        } else {
            match self.rates.waiver_rate(profile.age, profile.gender) {
                Some(rate) => per_mille(rate, base),
                None => self.missing_rate("waiver", profile.age)?,
            }
        };

        debug!("waiver on {}: base {} premium {}", profile.id, base, premium);
        Ok(Some(WaiverPremium {
            person_id,
            base,
            premium,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{ProductRules, RateTables};
    use crate::policy::{
        Gender, InsuredPerson, MainProduct, MainSelection, PaymentFrequency, PersonProfile, RiderKind,
        WaiverSelection,
    };
    use crate::quote::{CalcMode, PremiumResult};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn profile(id: &str, age: u32, gender: Gender) -> PersonProfile {
        PersonProfile {
            id: id.into(),
            name: id.into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender,
            risk_group: 1,
            age,
            days_since_birth: age as i64 * 365,
        }
    }

    fn insured(id: &str, age: u32, is_main: bool) -> InsuredPerson {
        InsuredPerson {
            profile: profile(id, age, Gender::Male),
            riders: Default::default(),
            is_main,
        }
    }

    fn result(person: &InsuredPerson, main_base: Amount, riders: &[(RiderKind, Amount)]) -> PremiumResult {
        PremiumResult::new(person, main_base, 0, riders.iter().copied().collect::<BTreeMap<_, _>>())
    }

    fn state(waiver: Option<WaiverAssignee>) -> PolicyState {
        PolicyState {
            reference_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            main_person: insured("main", 32, true),
            supplementary: vec![insured("spouse", 31, false), insured("kid", 5, false)],
            main: MainSelection {
                product: MainProduct::WholeLife,
                sum_insured: 500_000_000,
                entered_premium: 0,
                payment_term: 20,
                extra_premium: 0,
                term_option: None,
            },
            frequency: PaymentFrequency::Annual,
            waiver: waiver.map(|assignee| WaiverSelection { assignee }),
            target_age: None,
        }
    }

    fn ledger(state: &PolicyState) -> PremiumLedger {
        PremiumLedger::new(vec![
            result(&state.main_person, 2_000_000, &[(RiderKind::CriticalIllness, 450_000)]),
            result(&state.supplementary[0], 0, &[(RiderKind::Health, 1_070_000), (RiderKind::Accident, 300_000)]),
            result(&state.supplementary[1], 0, &[(RiderKind::HospitalCash, 480_000)]),
        ])
    }

    #[test]
    fn test_base_excludes_listed_assignee_riders() {
        let st = state(None);
        let ledger = ledger(&st);
        let everyone = 2_000_000 + 450_000 + 1_070_000 + 300_000 + 480_000;

        let spouse = WaiverAssignee::Listed("spouse".into());
        assert_eq!(waiver_base(&spouse, &ledger), everyone - 1_370_000);

        // The main person keeps their own main premium in the base
        let main = WaiverAssignee::Listed("main".into());
        assert_eq!(waiver_base(&main, &ledger), everyone - 450_000);

        let other = WaiverAssignee::Other(profile("payer", 45, Gender::Female));
        assert_eq!(waiver_base(&other, &ledger), everyone);
    }

    #[test]
    fn test_waiver_premium_for_listed_person() {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        let ctx = RatingContext::new(&rates, &rules, CalcMode::Current);
        let st = state(Some(WaiverAssignee::Listed("spouse".into())));
        let ledger = ledger(&st);

        let waiver = ctx.waiver_premium(&st, &ledger).unwrap().unwrap();
        assert_eq!(waiver.person_id.as_deref(), Some("spouse"));
        assert_eq!(waiver.base, 2_930_000);
        // Male 30-34 waiver rate 3.38 per mille
        assert_eq!(waiver.premium, per_mille(3.38, 2_930_000));
        assert_eq!(waiver.premium % 1000, 0);
    }

    #[test]
    fn test_ineligible_assignee() {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        let st = state(Some(WaiverAssignee::Other(profile("payer", 61, Gender::Male))));
        let ledger = ledger(&st);

        let current = RatingContext::new(&rates, &rules, CalcMode::Current);
        assert!(matches!(
            current.waiver_premium(&st, &ledger),
            Err(CalcError::IneligibleAssignee { age: 61 })
        ));

        let projected = RatingContext::new(&rates, &rules, CalcMode::Projected);
        let waiver = projected.waiver_premium(&st, &ledger).unwrap().unwrap();
        assert_eq!(waiver.premium, 0);

        let st = state(Some(WaiverAssignee::Listed("kid".into())));
        assert!(matches!(
            current.waiver_premium(&st, &ledger),
            Err(CalcError::IneligibleAssignee { age: 5 })
        ));
    }

    #[test]
    fn test_no_waiver_selected() {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        let ctx = RatingContext::new(&rates, &rules, CalcMode::Current);
        let st = state(None);
        assert!(ctx.waiver_premium(&st, &ledger(&st)).unwrap().is_none());
    }
}
