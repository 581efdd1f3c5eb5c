use once_cell::sync::Lazy;
use regex::Regex;
use time::{Date, OffsetDateTime};

use crate::answers::{ErrorSet, FieldKey, ValidationError, ValidationErrorSet};
use crate::case::{ApplianceCategory, CaseSubmission};
use crate::fields::{Field, ValidationScope};

/// Accepted email shape.
///
/// Local part: one or more of ``A-Za-z0-9.!#$%&'*+/=?^_`{|}~-``. Domain: at
/// least two dot-separated labels, each 1-63 alphanumerics with hyphens
/// allowed only inside the label. Input is trimmed before matching.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Current calendar date in UTC; the reference point for delivery dates.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Validates every field against today's date.
pub fn validate(submission: &CaseSubmission) -> ValidationErrorSet {
    validate_at(submission, today_utc())
}

/// Validates every field; a delivery date earlier than `today` is an error.
pub fn validate_at(submission: &CaseSubmission, today: Date) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();
    let doctor = &submission.doctor;

    require_text(
        &mut errors,
        Field::DoctorName,
        &doctor.name,
        "Doctor name is required",
    );
    require_text(
        &mut errors,
        Field::PracticeName,
        &doctor.practice_name,
        "Practice name is required",
    );
    require_email(
        &mut errors,
        Field::DoctorEmail,
        &doctor.email,
        "Email is required",
    );
    require_text(
        &mut errors,
        Field::DoctorPhone,
        &doctor.phone,
        "Phone number is required",
    );
    require_text(
        &mut errors,
        Field::PatientIdentifier,
        &submission.patient_identifier,
        "Patient identifier is required",
    );

    match submission.appliance_category {
        None => errors.insert(
            Field::ApplianceCategory,
            ValidationError::new("Please select an appliance type", "required"),
        ),
        Some(category) => {
            if submission.appliance_detail.selection(category).is_none() {
                errors.insert(
                    Field::detail_for(category),
                    ValidationError::new(detail_required_message(category), "required"),
                );
            }
        }
    }

    if let Some(date) = submission.requested_delivery_date
        && date < today
    {
        errors.insert(
            Field::RequestedDeliveryDate,
            ValidationError::new("Delivery date cannot be in the past", "past_date"),
        );
    }

    errors
}

/// Runs the full rule set and keeps only the fields of `scope`.
pub fn validate_scoped(
    submission: &CaseSubmission,
    scope: ValidationScope,
    today: Date,
) -> ValidationErrorSet {
    validate_at(submission, today).scoped(scope)
}

fn detail_required_message(category: ApplianceCategory) -> &'static str {
    match category {
        ApplianceCategory::Sleep => "Please select a sleep appliance type",
        ApplianceCategory::Orthodontic => "Please select an orthodontic appliance type",
        ApplianceCategory::CrownBridge => "Please select a crown or bridge type",
        ApplianceCategory::Aligner => "Please select an aligner system",
    }
}

/// Records a `required` error when `value` is blank; returns whether it was present.
pub(crate) fn require_text<F: FieldKey>(
    errors: &mut ErrorSet<F>,
    field: F,
    value: &str,
    message: &str,
) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, ValidationError::new(message, "required"));
        false
    } else {
        true
    }
}

pub(crate) fn require_email<F: FieldKey>(
    errors: &mut ErrorSet<F>,
    field: F,
    value: &str,
    required_message: &str,
) {
    if require_text(errors, field, value, required_message) && !is_email(value) {
        errors.insert(
            field,
            ValidationError::new("Invalid email format", "email_format"),
        );
    }
}

/// Records a `pattern` error when a present value does not match `pattern`.
pub(crate) fn require_match<F: FieldKey>(
    errors: &mut ErrorSet<F>,
    field: F,
    value: &str,
    required_message: &str,
    pattern: &Regex,
    mismatch_message: &str,
) {
    if require_text(errors, field, value, required_message) && !pattern.is_match(value.trim()) {
        errors.insert(field, ValidationError::new(mismatch_message, "pattern"));
    }
}
