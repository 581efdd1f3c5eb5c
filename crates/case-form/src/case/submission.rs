use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

use crate::answers::ValidationErrorSet;
use crate::case::appliance::{ApplianceCategory, ApplianceDetails, ApplianceSelection};
use crate::validate::validate_at;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, time::error::Parse> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]"))
}

pub fn format_date(date: Date) -> String {
    date.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub practice_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl DoctorInfo {
    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            practice_name: self.practice_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

/// Working data of the case wizard, edited field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseSubmission {
    #[serde(default)]
    pub doctor: DoctorInfo,
    #[serde(default)]
    pub patient_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appliance_category: Option<ApplianceCategory>,
    #[serde(default)]
    pub appliance_detail: ApplianceDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub rush_order: bool,
    #[serde(
        default,
        with = "iso_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub requested_delivery_date: Option<Date>,
}

impl CaseSubmission {
    /// Active appliance choice, if the category's own slot is filled.
    pub fn selection(&self) -> Option<ApplianceSelection> {
        self.appliance_category
            .and_then(|category| self.appliance_detail.selection(category))
    }

    /// Switches category without touching any detail slot.
    pub fn select_category(&mut self, category: ApplianceCategory) {
        self.appliance_category = Some(category);
    }

    /// Sets both the category and the detail slot for it.
    pub fn select_appliance(&mut self, selection: ApplianceSelection) {
        self.appliance_category = Some(selection.category());
        self.appliance_detail.store(selection);
    }

    /// Converts the working data into payload form, or returns the full
    /// error set when anything is still invalid on `today`.
    pub fn validated(&self, today: Date) -> Result<ValidatedCase, ValidationErrorSet> {
        let errors = validate_at(self, today);
        match self.selection() {
            Some(appliance) if errors.is_empty() => Ok(ValidatedCase {
                doctor: self.doctor.trimmed(),
                patient_identifier: self.patient_identifier.trim().to_string(),
                appliance,
                special_instructions: self
                    .special_instructions
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string),
                rush_order: self.rush_order,
                requested_delivery_date: self.requested_delivery_date,
            }),
            _ => Err(errors),
        }
    }
}

/// Case fields as handed to the submission collaborator. The appliance is
/// carried as a tagged union, so inactive category slots cannot leak in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedCase {
    pub doctor: DoctorInfo,
    pub patient_identifier: String,
    #[serde(flatten)]
    pub appliance: ApplianceSelection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub rush_order: bool,
    #[serde(
        default,
        with = "iso_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub requested_delivery_date: Option<Date>,
}
