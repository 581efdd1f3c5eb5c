pub mod appliance;
pub mod submission;

pub use appliance::{
    AlignerSystem, ApplianceCategory, ApplianceDetails, ApplianceSelection, Choice, CrownType,
    OrthoAppliance, SleepAppliance,
};
pub use submission::{CaseSubmission, DoctorInfo, ValidatedCase, format_date, parse_date};
