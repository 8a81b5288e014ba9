//! Quote inputs, person normalization and snapshot loading

mod data;
mod profile;
mod state;
pub mod loader;

pub use data::{
    Gender, HealthAddon, HealthProgram, HealthScope, HealthSelection, HospitalCashSelection,
    MainProduct, MainSelection, PaymentFrequency, PersonInput, PolicyInput, Pricing, RiderKind,
    RiderSelections, SumInsuredSelection, WaiverInput, OTHER_ASSIGNEE,
};
pub use profile::{age_on, parse_birth_date, PersonProfile, DOB_FORMAT};
pub use state::{InsuredPerson, PolicyState, WaiverAssignee, WaiverSelection};
pub use loader::{
    load_policy_input, load_policy_input_from_reader, load_policy_inputs_from_dir, resolve_occupations,
};
