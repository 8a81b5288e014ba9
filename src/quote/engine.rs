//! Quote engine: runs one full pass over a normalized policy

use log::{debug, info};

use super::{
    aggregate, available_tiers, prorate, CalcMode, HospitalCashAllocator, PremiumLedger, PremiumResult,
    QuoteResult, RatingContext,
};
use crate::assumptions::{ProductRules, RateSource, RateTables};
use crate::error::CalcError;
use crate::money::{Amount, ROUNDING_UNIT};
use crate::policy::PolicyState;

/// Prices a policy snapshot against one set of tables and rules
pub struct QuoteEngine<'a, R: RateSource = RateTables> {
    rates: &'a R,
    rules: &'a ProductRules,
}

impl<'a, R: RateSource> QuoteEngine<'a, R> {
    pub fn new(rates: &'a R, rules: &'a ProductRules) -> Self {
        Self { rates, rules }
    }

    pub fn rules(&self) -> &ProductRules {
        self.rules
    }

    /// Annual main base premium at issue
    pub fn main_premium(&self, state: &PolicyState) -> Result<Amount, CalcError> {
        RatingContext::new(self.rates, self.rules, CalcMode::Current)
            .main_premium(&state.main_person.profile, &state.main)
    }

    /// Issue-date quote
    pub fn quote(&self, state: &PolicyState) -> Result<QuoteResult, CalcError> {
        let main_base = self.main_premium(state)?;
        let extra = state.main.extra_premium - state.main.extra_premium % ROUNDING_UNIT;
        let result = self.price_pass(state, main_base, extra, CalcMode::Current)?;
        info!(
            "quoted {} person(s): total {} ({} per {} installment)",
            state.person_count(),
            result.summary.total,
            result.frequency.per_period,
            state.frequency.as_str()
        );
        Ok(result)
    }

    /// Riders, waiver, aggregation and proration around a known main premium
    ///
    /// The main premium is an input here: rider gating and the hospital-cash
    /// cap depend on it, so it must be settled before any rider is rated.
    pub fn price_pass(
        &self,
        state: &PolicyState,
        main_base: Amount,
        extra: Amount,
        mode: CalcMode,
    ) -> Result<QuoteResult, CalcError> {
        let ctx = RatingContext::new(self.rates, self.rules, mode);
        let cap = self.rules.hospital_cash.policy_cap(main_base);
        debug!("hospital cash cap {} for main premium {}", cap, main_base);

        let (results, allocator) = state.persons().try_fold(
            (Vec::with_capacity(state.person_count()), HospitalCashAllocator::new(cap)),
            |(mut results, allocator), person| {
                let (riders, allocator) = ctx.rider_premiums(person, allocator)?;
                results.push(PremiumResult::new(person, main_base, extra, riders));
                Ok::<_, CalcError>((results, allocator))
            },
        )?;
        let ledger = PremiumLedger::new(results);

        let waiver = ctx.waiver_premium(state, &ledger)?;
        let (persons, summary) = aggregate(ledger, waiver.as_ref(), &allocator)?;

        let frequency = prorate(
            summary.base_main,
            summary.extra,
            summary.total_riders,
            state.frequency,
            &self.rules.loading,
        );

        Ok(QuoteResult {
            persons,
            waiver,
            summary,
            frequency,
            hospital_cash_cap: allocator.cap(),
            hospital_cash_allocated: allocator.allocated(),
            available_tiers: available_tiers(self.rules, main_base).into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{
        Gender, HealthProgram, HealthSelection, HealthScope, HospitalCashSelection, MainProduct, MainSelection,
        PaymentFrequency, PersonInput, PolicyInput, RiderKind, RiderSelections, SumInsuredSelection, WaiverInput,
    };
    use chrono::NaiveDate;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn person(id: &str, dob: &str, gender: Gender, riders: RiderSelections) -> PersonInput {
        PersonInput {
            id: id.into(),
            name: format!("Person {id}"),
            dob: dob.into(),
            gender,
            risk_group: 1,
            occupation: None,
            riders,
        }
    }

    fn whole_life(sum_insured: Amount) -> MainSelection {
        MainSelection {
            product: MainProduct::WholeLife,
            sum_insured,
            entered_premium: 0,
            payment_term: 20,
            extra_premium: 0,
            term_option: None,
        }
    }

    fn input(main: PersonInput, supplementary: Vec<PersonInput>, selection: MainSelection) -> PolicyInput {
        PolicyInput {
            main_person: main,
            supplementary,
            main: selection,
            frequency: PaymentFrequency::Annual,
            waiver: None,
            target_age: None,
        }
    }

    fn hospital(daily_benefit: Amount) -> RiderSelections {
        RiderSelections {
            hospital_cash: Some(HospitalCashSelection { daily_benefit }),
            ..Default::default()
        }
    }

    #[test]
    fn test_whole_life_with_critical_illness_quarterly() {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        let engine = QuoteEngine::new(&rates, &rules);

        let riders = RiderSelections {
            critical_illness: Some(SumInsuredSelection { sum_insured: 300_000_000 }),
            ..Default::default()
        };
        let mut input = input(person("main", "01/01/1996", Gender::Male, riders), vec![], whole_life(500_000_000));
        input.frequency = PaymentFrequency::Quarterly;
        let state = PolicyState::from_input(&input, reference()).unwrap();

        let result = engine.quote(&state).unwrap();
        let main = result.persons.get("main").unwrap();
        assert_eq!(main.main_base, 2_000_000);
        assert_eq!(main.riders[&RiderKind::CriticalIllness], 450_000);
        assert_eq!(result.summary.total, 2_450_000);

        assert_eq!(result.frequency.main_per_period, 500_000);
        assert_eq!(result.frequency.riders_per_period, 117_000);
        assert_eq!(result.frequency.rider_variance, 18_000);
        assert_eq!(result.frequency.variance, 18_000);
        assert_eq!(result.hospital_cash_cap, 0);
    }

    #[test]
    fn test_hospital_cap_shared_in_person_order() {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        let engine = QuoteEngine::new(&rates, &rules);

        // 4.0 per mille of 2,000,000,000 = 8,000,000 main premium, cap 200,000
        let accepted = input(
            person("a", "01/01/1996", Gender::Male, hospital(100_000)),
            vec![person("b", "01/01/1994", Gender::Female, hospital(100_000))],
            whole_life(2_000_000_000),
        );
        let state = PolicyState::from_input(&accepted, reference()).unwrap();
        let result = engine.quote(&state).unwrap();
        assert_eq!(result.summary.base_main, 8_000_000);
        assert_eq!(result.hospital_cash_cap, 200_000);
        assert_eq!(result.hospital_cash_allocated, 200_000);

        let rejected = input(
            person("a", "01/01/1996", Gender::Male, hospital(150_000)),
            vec![person("b", "01/01/1994", Gender::Female, hospital(100_000))],
            whole_life(2_000_000_000),
        );
        let state = PolicyState::from_input(&rejected, reference()).unwrap();
        match engine.quote(&state) {
            Err(CalcError::HospitalCapExceeded { person, requested, remaining }) => {
                assert_eq!(person, "b");
                assert_eq!(requested, 100_000);
                assert_eq!(remaining, 50_000);
            }
            other => panic!("expected cap error, got {other:?}"),
        }
    }

    #[test]
    fn test_waiver_on_listed_person_and_totals() {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        let engine = QuoteEngine::new(&rates, &rules);

        let spouse_riders = RiderSelections {
            health: Some(HealthSelection {
                program: HealthProgram::Basic,
                scope: HealthScope::Domestic,
                outpatient: false,
                dental: false,
            }),
            ..Default::default()
        };
        let mut input = input(
            person("main", "01/01/1996", Gender::Male, RiderSelections::default()),
            vec![person("spouse", "01/01/1995", Gender::Male, spouse_riders)],
            whole_life(500_000_000),
        );
        input.waiver = Some(WaiverInput {
            assignee: "spouse".into(),
            other_person: None,
        });
        let state = PolicyState::from_input(&input, reference()).unwrap();
        let result = engine.quote(&state).unwrap();

        let waiver = result.waiver.clone().unwrap();
        // Spouse's own health premium is left out of their waiver base
        assert_eq!(waiver.base, 2_000_000);
        let spouse = result.persons.get("spouse").unwrap();
        assert_eq!(spouse.main_base, 0);
        assert_eq!(spouse.waiver, waiver.premium);
        assert_eq!(spouse.total, 1_070_000 + waiver.premium);
        assert_eq!(result.summary.total, 2_000_000 + 1_070_000 + waiver.premium);
        assert_eq!(result.summary.total_riders, 1_070_000 + waiver.premium);
    }

    #[test]
    fn test_extra_premium_on_main_person_only() {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        let engine = QuoteEngine::new(&rates, &rules);

        let mut selection = whole_life(500_000_000);
        selection.extra_premium = 1_000_500;
        let input = input(
            person("main", "01/01/1996", Gender::Male, RiderSelections::default()),
            vec![person("kid", "01/01/2020", Gender::Female, RiderSelections::default())],
            selection,
        );
        let state = PolicyState::from_input(&input, reference()).unwrap();
        let result = engine.quote(&state).unwrap();

        assert_eq!(result.persons.get("main").unwrap().extra, 1_000_000);
        assert_eq!(result.persons.get("kid").unwrap().total, 0);
        assert_eq!(result.summary.total, 3_000_000);
    }

    #[test]
    fn test_missing_rate_aborts_current_pass() {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        let engine = QuoteEngine::new(&rates, &rules);

        // Whole-life rates stop at 70
        let input = input(
            person("main", "01/01/1950", Gender::Male, RiderSelections::default()),
            vec![],
            whole_life(500_000_000),
        );
        let state = PolicyState::from_input(&input, reference()).unwrap();
        assert!(matches!(engine.quote(&state), Err(CalcError::MissingRate { .. })));
    }

    #[test]
    fn test_tiers_follow_main_premium() {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        let engine = QuoteEngine::new(&rates, &rules);

        let input = input(
            person("main", "01/01/1996", Gender::Male, RiderSelections::default()),
            vec![],
            whole_life(2_000_000_000),
        );
        let state = PolicyState::from_input(&input, reference()).unwrap();
        let result = engine.quote(&state).unwrap();
        assert_eq!(
            result.available_tiers,
            vec![HealthProgram::Basic, HealthProgram::Advanced]
        );
    }
}
