//! Non-fatal validation of a policy snapshot
//!
//! Checks never stop a pass: every problem found is reported as a
//! field-scoped [`ValidationOutcome`] and calculation carries on with whatever
//! can be computed.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::assumptions::{ProductRules, RateSource, RateTables};
use crate::money::Amount;
use crate::policy::{
    MainProduct, PersonInput, PersonProfile, PolicyInput, Pricing, RiderSelections, OTHER_ASSIGNEE,
};
use crate::quote::{available_tiers, premium_range, CalcMode};

/// One field-scoped problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Dotted field path, e.g. `main.sum_insured` or `kid.hospital_cash.daily_benefit`
    pub field: String,
    pub message: String,
}

impl ValidationOutcome {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validates snapshots against product rules
pub struct ValidationEngine<'a, R: RateSource = RateTables> {
    rates: &'a R,
    rules: &'a ProductRules,
}

impl<'a, R: RateSource> ValidationEngine<'a, R> {
    pub fn new(rates: &'a R, rules: &'a ProductRules) -> Self {
        Self { rates, rules }
    }

    /// All problems found in `input`
    ///
    /// `main_premium` is the computed main base premium when the pass got
    /// that far; checks that depend on it are skipped otherwise.
    pub fn validate(
        &self,
        input: &PolicyInput,
        reference: NaiveDate,
        main_premium: Option<Amount>,
    ) -> Vec<ValidationOutcome> {
        let mut out = Vec::new();

        let main_profile = self.check_main_person(&input.main_person, reference, &mut out);
        if let Some(profile) = &main_profile {
            self.check_main_selection(input, profile, main_premium, &mut out);
        }

        self.check_person_ids(input, &mut out);

        let mut hospital_remaining = main_premium.map(|p| self.rules.hospital_cash.policy_cap(p));
        for person in input.persons() {
            let Ok(profile) = PersonProfile::from_input(person, reference) else {
                continue;
            };
            self.check_riders(&profile, &person.riders, main_premium, &mut hospital_remaining, &mut out);
        }

        self.check_waiver(input, reference, &mut out);

        debug!("validation found {} problem(s)", out.len());
        out
    }

    fn check_main_person(
        &self,
        person: &PersonInput,
        reference: NaiveDate,
        out: &mut Vec<ValidationOutcome>,
    ) -> Option<PersonProfile> {
        if person.name.trim().is_empty() {
            out.push(ValidationOutcome::new("main_person.name", "name is required"));
        }
        let max_group = self.rules.accident.max_risk_group;
        if person.risk_group == 0 {
            out.push(ValidationOutcome::new(
                "main_person.risk_group",
                "occupation must be classified into a risk group",
            ));
        } else if person.risk_group > max_group {
            out.push(ValidationOutcome::new(
                "main_person.risk_group",
                format!("risk group must be between 1 and {max_group}"),
            ));
        }
        match PersonProfile::from_input(person, reference) {
            Ok(profile) => Some(profile),
            Err(e) => {
                out.push(ValidationOutcome::new("main_person.dob", e.to_string()));
                None
            }
        }
    }

    fn check_person_ids(&self, input: &PolicyInput, out: &mut Vec<ValidationOutcome>) {
        let mut seen = HashSet::new();
        for person in input.persons() {
            if person.id == OTHER_ASSIGNEE {
                out.push(ValidationOutcome::new(
                    format!("{}.id", person.id),
                    format!("'{OTHER_ASSIGNEE}' is reserved for an assignee outside the policy"),
                ));
            } else if !seen.insert(person.id.as_str()) {
                out.push(ValidationOutcome::new(
                    format!("{}.id", person.id),
                    "person id is used more than once",
                ));
            }
        }
    }

    fn check_main_selection(
        &self,
        input: &PolicyInput,
        profile: &PersonProfile,
        main_premium: Option<Amount>,
        out: &mut Vec<ValidationOutcome>,
    ) {
        let main = &input.main;
        let terms = self.rules.product(main.product);
        let age = profile.age;

        let entry = terms.entry;
        if !entry.admits(profile, CalcMode::Current) {
            out.push(ValidationOutcome::new(
                "main.product",
                format!(
                    "{} is not offered at age {} (entry ages {}-{})",
                    main.product.as_str(),
                    age,
                    entry.min_age,
                    entry.max_entry_age
                ),
            ));
        }

        if main.product != MainProduct::FixedBenefitTerm && main.sum_insured < terms.min_sum_insured {
            out.push(ValidationOutcome::new(
                "main.sum_insured",
                format!("sum insured must be at least {}", terms.min_sum_insured),
            ));
        }

        if main.product.pricing() == Pricing::PremiumDriven {
            match premium_range(self.rates, self.rules, age, main.sum_insured) {
                Some(range) if !range.contains(main.entered_premium) => out.push(ValidationOutcome::new(
                    "main.entered_premium",
                    format!("premium must be between {} and {}", range.min, range.max),
                )),
                Some(_) => {}
                None => out.push(ValidationOutcome::new(
                    "main.entered_premium",
                    format!("no premium factors for age {age}"),
                )),
            }
        }

        let base = match (main_premium, main.product.pricing()) {
            (Some(premium), _) => Some(premium),
            (None, Pricing::PremiumDriven) => Some(main.entered_premium),
            (None, Pricing::Rated) => None,
        };
        if let Some(base) = base {
            let limit = base.saturating_mul(self.rules.extra_premium_multiple);
            if main.extra_premium > limit {
                out.push(ValidationOutcome::new(
                    "main.extra_premium",
                    format!(
                        "extra premium may not exceed {}x the main premium ({})",
                        self.rules.extra_premium_multiple, limit
                    ),
                ));
            }
        }

        if main.product == MainProduct::TermChoice {
            let offered = self.rules.term_options(age);
            match main.term_option {
                None => out.push(ValidationOutcome::new("main.term_option", "choose a term")),
                Some(term) if !offered.contains(&term) => out.push(ValidationOutcome::new(
                    "main.term_option",
                    format!("a {term}-year term is not offered at age {age} (offered: {offered:?})"),
                )),
                Some(_) => {}
            }
        } else if terms.fixed_term.is_none() {
            let max = self.rules.max_payment_term(age);
            if main.payment_term < terms.min_payment_term || main.payment_term > max {
                out.push(ValidationOutcome::new(
                    "main.payment_term",
                    format!("payment term must be between {} and {} years", terms.min_payment_term, max),
                ));
            }
        }

        if let Some(target) = input.target_age {
            let term = self.rules.payment_term(main);
            let min = age.saturating_add(term).saturating_sub(1);
            let max = self.rules.max_coverage_age;
            if target < min || target > max {
                out.push(ValidationOutcome::new(
                    "target_age",
                    format!("target age must be between {min} and {max}"),
                ));
            }
        }
    }

    fn check_riders(
        &self,
        profile: &PersonProfile,
        riders: &RiderSelections,
        main_premium: Option<Amount>,
        hospital_remaining: &mut Option<Amount>,
        out: &mut Vec<ValidationOutcome>,
    ) {
        let id = &profile.id;

        if let (Some(health), Some(premium)) = (&riders.health, main_premium) {
            if !available_tiers(self.rules, premium).contains(&health.program) {
                out.push(ValidationOutcome::new(
                    format!("{id}.health.program"),
                    format!("{} needs a higher main premium", health.program.as_str()),
                ));
            }
        }

        if let Some(ci) = &riders.critical_illness {
            let range = self.rules.critical_illness;
            if !range.contains(ci.sum_insured) {
                out.push(ValidationOutcome::new(
                    format!("{id}.critical_illness.sum_insured"),
                    format!("sum insured must be between {} and {}", range.min, range.max),
                ));
            }
        }

        if let Some(accident) = &riders.accident {
            if profile.risk_group == 0 {
                out.push(ValidationOutcome::new(
                    format!("{id}.accident.risk_group"),
                    "accident cover needs a classified risk group",
                ));
            }
            let range = self.rules.accident.sum_insured;
            if !range.contains(accident.sum_insured) {
                out.push(ValidationOutcome::new(
                    format!("{id}.accident.sum_insured"),
                    format!("sum insured must be between {} and {}", range.min, range.max),
                ));
            }
        }

        if let Some(hospital) = &riders.hospital_cash {
            let field = format!("{id}.hospital_cash.daily_benefit");
            let rules = &self.rules.hospital_cash;
            let daily = hospital.daily_benefit;
            let ceiling = rules.person_ceiling(profile.age);

            if rules.benefit_step > 0 && daily % rules.benefit_step != 0 {
                out.push(ValidationOutcome::new(
                    &field,
                    format!("daily benefit must be a multiple of {}", rules.benefit_step),
                ));
            }
            if daily < rules.min_daily_benefit || daily > ceiling {
                out.push(ValidationOutcome::new(
                    &field,
                    format!("daily benefit must be between {} and {}", rules.min_daily_benefit, ceiling),
                ));
            }
            if self.rules.windows.hospital_cash.admits(profile, CalcMode::Current) {
                if let Some(remaining) = hospital_remaining.as_mut() {
                    if daily > *remaining {
                        out.push(ValidationOutcome::new(
                            &field,
                            format!("only {} per day is left of the policy allowance", *remaining),
                        ));
                    } else {
                        *remaining -= daily;
                    }
                }
            }
        }
    }

    fn check_waiver(&self, input: &PolicyInput, reference: NaiveDate, out: &mut Vec<ValidationOutcome>) {
        let Some(waiver) = &input.waiver else {
            return;
        };

        let assignee = if waiver.assignee == OTHER_ASSIGNEE {
            match &waiver.other_person {
                Some(person) => person,
                None => {
                    out.push(ValidationOutcome::new(
                        "waiver.other_person",
                        "details of the waiver assignee are required",
                    ));
                    return;
                }
            }
        } else {
            match input.persons().find(|p| p.id == waiver.assignee) {
                Some(person) => person,
                None => {
                    out.push(ValidationOutcome::new(
                        "waiver.assignee",
                        format!("'{}' is not a listed person", waiver.assignee),
                    ));
                    return;
                }
            }
        };

        match PersonProfile::from_input(assignee, reference) {
            Ok(profile) => {
                let window = self.rules.windows.waiver;
                if !window.admits(&profile, CalcMode::Current) {
                    out.push(ValidationOutcome::new(
                        "waiver.assignee",
                        format!(
                            "assignee must be aged {}-{} (is {})",
                            window.min_age, window.max_entry_age, profile.age
                        ),
                    ));
                }
            }
            Err(e) => out.push(ValidationOutcome::new("waiver.other_person.dob", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{
        Gender, HealthProgram, HealthSelection, HealthScope, HospitalCashSelection, MainSelection, PaymentFrequency,
        SumInsuredSelection, WaiverInput,
    };

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn person(id: &str, dob: &str) -> PersonInput {
        PersonInput {
            id: id.into(),
            name: format!("Person {id}"),
            dob: dob.into(),
            gender: Gender::Male,
            risk_group: 1,
            occupation: None,
            riders: RiderSelections::default(),
        }
    }

    fn policy(main: MainSelection) -> PolicyInput {
        PolicyInput {
            main_person: person("main", "01/01/1996"),
            supplementary: vec![],
            main,
            frequency: PaymentFrequency::Annual,
            waiver: None,
            target_age: None,
        }
    }

    fn whole_life() -> MainSelection {
        MainSelection {
            product: MainProduct::WholeLife,
            sum_insured: 500_000_000,
            entered_premium: 0,
            payment_term: 20,
            extra_premium: 0,
            term_option: None,
        }
    }

    fn fields(outcomes: &[ValidationOutcome]) -> Vec<&str> {
        outcomes.iter().map(|o| o.field.as_str()).collect()
    }

    fn validate(input: &PolicyInput, main_premium: Option<Amount>) -> Vec<ValidationOutcome> {
        let rates = RateTables::bundled().unwrap();
        let rules = ProductRules::default();
        ValidationEngine::new(&rates, &rules).validate(input, reference(), main_premium)
    }

    #[test]
    fn test_clean_policy() {
        assert!(validate(&policy(whole_life()), Some(2_000_000)).is_empty());
    }

    #[test]
    fn test_mandatory_main_fields() {
        let mut input = policy(whole_life());
        input.main_person.name = "  ".into();
        input.main_person.risk_group = 0;
        input.main_person.dob = "31/02/1990".into();
        let out = validate(&input, None);
        assert_eq!(fields(&out), vec!["main_person.name", "main_person.risk_group", "main_person.dob"]);

        // Supplementary persons have no mandatory name
        let mut input = policy(whole_life());
        let mut kid = person("kid", "01/01/2020");
        kid.name.clear();
        input.supplementary.push(kid);
        assert!(validate(&input, Some(2_000_000)).is_empty());
    }

    #[test]
    fn test_main_selection_bounds() {
        let mut main = whole_life();
        main.sum_insured = 50_000_000;
        main.payment_term = 5;
        main.extra_premium = 1_000_001;
        let out = validate(&policy(main), Some(200_000));
        assert_eq!(fields(&out), vec!["main.sum_insured", "main.extra_premium", "main.payment_term"]);

        let mut main = whole_life();
        main.payment_term = 70;
        assert_eq!(fields(&validate(&policy(main), None)), vec!["main.payment_term"]);
    }

    #[test]
    fn test_entry_window() {
        let mut input = policy(MainSelection {
            product: MainProduct::FixedBenefitTerm,
            ..whole_life()
        });
        input.main_person.dob = "01/01/2020".into();
        assert_eq!(fields(&validate(&input, None)), vec!["main.product"]);
    }

    #[test]
    fn test_flexible_premium_range() {
        let mut main = MainSelection {
            product: MainProduct::PulWholeLife,
            entered_premium: 8_000_000,
            ..whole_life()
        };
        // Age 30 factors 25-60: range 8,333,334 - 20,000,000
        let out = validate(&policy(main.clone()), None);
        assert_eq!(fields(&out), vec!["main.entered_premium"]);

        main.entered_premium = 10_000_000;
        main.extra_premium = 60_000_000;
        assert_eq!(fields(&validate(&policy(main), None)), vec!["main.extra_premium"]);
    }

    #[test]
    fn test_term_choice_menu() {
        let mut main = MainSelection {
            product: MainProduct::TermChoice,
            ..whole_life()
        };
        assert_eq!(fields(&validate(&policy(main.clone()), None)), vec!["main.term_option"]);

        main.term_option = Some(10);
        assert!(validate(&policy(main.clone()), None).is_empty());

        let mut input = policy(MainSelection {
            term_option: Some(15),
            ..main
        });
        input.main_person.dob = "01/01/1965".into();
        assert_eq!(fields(&validate(&input, None)), vec!["main.term_option"]);
    }

    #[test]
    fn test_target_age_bounds() {
        let mut input = policy(whole_life());
        // Age 30, 20-year term: target must be within 49-100
        input.target_age = Some(48);
        assert_eq!(fields(&validate(&input, None)), vec!["target_age"]);
        input.target_age = Some(49);
        assert!(validate(&input, None).is_empty());
        input.target_age = Some(101);
        assert_eq!(fields(&validate(&input, None)), vec!["target_age"]);
    }

    #[test]
    fn test_rider_bounds() {
        let mut input = policy(whole_life());
        input.main_person.riders.critical_illness = Some(SumInsuredSelection { sum_insured: 100_000_000 });
        input.main_person.riders.accident = Some(SumInsuredSelection { sum_insured: 5_000_000 });
        input.main_person.riders.health = Some(HealthSelection {
            program: HealthProgram::Premier,
            scope: HealthScope::Domestic,
            outpatient: false,
            dental: false,
        });
        let out = validate(&input, Some(2_000_000));
        assert_eq!(
            fields(&out),
            vec!["main.health.program", "main.critical_illness.sum_insured", "main.accident.sum_insured"]
        );
    }

    #[test]
    fn test_hospital_cash_share_in_order() {
        let mut input = policy(whole_life());
        input.main_person.riders.hospital_cash = Some(HospitalCashSelection { daily_benefit: 150_000 });
        let mut spouse = person("spouse", "01/01/1994");
        spouse.riders.hospital_cash = Some(HospitalCashSelection { daily_benefit: 100_000 });
        let mut kid = person("kid", "01/01/2020");
        kid.riders.hospital_cash = Some(HospitalCashSelection { daily_benefit: 420_000 });
        input.supplementary = vec![spouse, kid];

        let out = validate(&input, Some(8_000_000));
        // Kid: not a 50,000 step and over the child ceiling; spouse: over the remaining 50,000
        assert_eq!(
            fields(&out),
            vec![
                "spouse.hospital_cash.daily_benefit",
                "kid.hospital_cash.daily_benefit",
                "kid.hospital_cash.daily_benefit",
                "kid.hospital_cash.daily_benefit",
            ]
        );
    }

    #[test]
    fn test_waiver_assignee() {
        let mut input = policy(whole_life());
        input.supplementary.push(person("kid", "01/01/2020"));

        input.waiver = Some(WaiverInput {
            assignee: "kid".into(),
            other_person: None,
        });
        assert_eq!(fields(&validate(&input, None)), vec!["waiver.assignee"]);

        input.waiver = Some(WaiverInput {
            assignee: "nobody".into(),
            other_person: None,
        });
        assert_eq!(fields(&validate(&input, None)), vec!["waiver.assignee"]);

        input.waiver = Some(WaiverInput {
            assignee: OTHER_ASSIGNEE.into(),
            other_person: None,
        });
        assert_eq!(fields(&validate(&input, None)), vec!["waiver.other_person"]);

        input.waiver = Some(WaiverInput {
            assignee: OTHER_ASSIGNEE.into(),
            other_person: Some(person("payer", "01/01/1970")),
        });
        assert!(validate(&input, None).is_empty());
    }

    #[test]
    fn test_risk_group_above_table() {
        let mut input = policy(whole_life());
        input.main_person.risk_group = 7;
        assert_eq!(fields(&validate(&input, None)), vec!["main_person.risk_group"]);
        input.main_person.risk_group = 4;
        assert!(validate(&input, None).is_empty());
    }

    #[test]
    fn test_person_ids_unique() {
        let mut input = policy(whole_life());
        input.supplementary.push(person("main", "01/01/2020"));
        input.supplementary.push(person(OTHER_ASSIGNEE, "01/01/1994"));
        assert_eq!(fields(&validate(&input, None)), vec!["main.id", "other.id"]);
    }

    #[test]
    fn test_oversized_values_are_reported() {
        let mut input = policy(MainSelection {
            payment_term: u32::MAX,
            extra_premium: u64::MAX,
            ..whole_life()
        });
        input.target_age = Some(60);
        assert_eq!(
            fields(&validate(&input, Some(2_000_000))),
            vec!["main.extra_premium", "main.payment_term", "target_age"]
        );

        let main = MainSelection {
            product: MainProduct::PulWholeLife,
            entered_premium: u64::MAX,
            ..whole_life()
        };
        assert_eq!(fields(&validate(&policy(main), None)), vec!["main.entered_premium"]);
    }
}
