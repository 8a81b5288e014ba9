//! Normalized policy state: the aggregate root of one calculation pass

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    MainSelection, PaymentFrequency, PersonInput, PersonProfile, PolicyInput, RiderSelections,
    OTHER_ASSIGNEE,
};
use crate::error::CalcError;

/// A normalized insured person with their rider choices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuredPerson {
    pub profile: PersonProfile,
    pub riders: RiderSelections,
    pub is_main: bool,
}

impl InsuredPerson {
    fn from_input(input: &PersonInput, is_main: bool, reference: NaiveDate) -> Result<Self, CalcError> {
        Ok(Self {
            profile: PersonProfile::from_input(input, reference)?,
            riders: input.riders.clone(),
            is_main,
        })
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }
}

/// Who the premium-waiver rider covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaiverAssignee {
    /// A person on the insured list, by id
    Listed(String),
    /// Someone outside the insured list (typically the payer)
    Other(PersonProfile),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverSelection {
    pub assignee: WaiverAssignee,
}

/// Normalized snapshot for a single pass
///
/// Persons are always visited main person first, then supplementary persons
/// in list order. The hospital-cash allowance depends on that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyState {
    pub reference_date: NaiveDate,
    pub main_person: InsuredPerson,
    pub supplementary: Vec<InsuredPerson>,
    pub main: MainSelection,
    pub frequency: PaymentFrequency,
    pub waiver: Option<WaiverSelection>,
    pub target_age: Option<u32>,
}

impl PolicyState {
    /// Normalize a raw snapshot
    ///
    /// Any unreadable birth date aborts the pass, as does a person id that is
    /// repeated or equal to the reserved `"other"` assignee.
    pub fn from_input(input: &PolicyInput, reference: NaiveDate) -> Result<Self, CalcError> {
        check_person_ids(input)?;

        let main_person = InsuredPerson::from_input(&input.main_person, true, reference)?;
        let supplementary = input
            .supplementary
            .iter()
            .map(|p| InsuredPerson::from_input(p, false, reference))
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = Self {
            reference_date: reference,
            main_person,
            supplementary,
            main: input.main.clone(),
            frequency: input.frequency,
            waiver: None,
            target_age: input.target_age,
        };

        if let Some(waiver) = &input.waiver {
            let assignee = if waiver.assignee == OTHER_ASSIGNEE {
                let other = waiver.other_person.as_ref().ok_or_else(|| CalcError::UnknownAssignee {
                    id: OTHER_ASSIGNEE.to_string(),
                })?;
                WaiverAssignee::Other(PersonProfile::from_input(other, reference)?)
            } else if state.person(&waiver.assignee).is_some() {
                WaiverAssignee::Listed(waiver.assignee.clone())
            } else {
                return Err(CalcError::UnknownAssignee {
                    id: waiver.assignee.clone(),
                });
            };
            state.waiver = Some(WaiverSelection { assignee });
        }

        Ok(state)
    }

    /// Persons in rating order
    pub fn persons(&self) -> impl Iterator<Item = &InsuredPerson> {
        std::iter::once(&self.main_person).chain(self.supplementary.iter())
    }

    pub fn person(&self, id: &str) -> Option<&InsuredPerson> {
        self.persons().find(|p| p.id() == id)
    }

    pub fn person_count(&self) -> usize {
        1 + self.supplementary.len()
    }

    /// Same policy `years` years after issue, every person aged accordingly
    pub fn aged(&self, years: u32) -> Self {
        let age_person = |p: &InsuredPerson| InsuredPerson {
            profile: p.profile.aged(years),
            ..p.clone()
        };
        Self {
            main_person: age_person(&self.main_person),
            supplementary: self.supplementary.iter().map(age_person).collect(),
            waiver: self.waiver.as_ref().map(|w| WaiverSelection {
                assignee: match &w.assignee {
                    WaiverAssignee::Other(profile) => WaiverAssignee::Other(profile.aged(years)),
                    listed => listed.clone(),
                },
            }),
            ..self.clone()
        }
    }
}

fn check_person_ids(input: &PolicyInput) -> Result<(), CalcError> {
    let mut seen = HashSet::new();
    for person in input.persons() {
        if person.id == OTHER_ASSIGNEE || !seen.insert(person.id.as_str()) {
            return Err(CalcError::DuplicatePerson {
                id: person.id.clone(),
            });
        }
    }
    Ok(())
}
