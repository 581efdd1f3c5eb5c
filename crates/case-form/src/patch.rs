use serde_json::{Map, Value};
use thiserror::Error;

use crate::answers::FieldKey;
use crate::case::{ApplianceCategory, ApplianceSelection, CaseSubmission, Choice, parse_date};
use crate::fields::Field;

/// Errors raised while applying a field patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("patch must be a JSON object map of field path -> value")]
    NotAnObject,
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{path}' expects {expected}")]
    TypeMismatch {
        path: &'static str,
        expected: &'static str,
    },
    #[error("'{value}' is not a valid choice for '{path}'")]
    UnknownChoice { path: &'static str, value: String },
    #[error("'{value}' is not a valid date for '{path}' (expected YYYY-MM-DD)")]
    InvalidDate { path: &'static str, value: String },
}

/// Applies a `field path -> value` object to the submission.
///
/// Nested objects are accepted as a shorthand, so `{"doctor": {"name": "A"}}`
/// and `{"doctor.name": "A"}` are equivalent. `null` or an empty string clears
/// a field. The patch is all-or-nothing: on error the submission is untouched.
pub fn apply_patch(submission: &mut CaseSubmission, patch: &Value) -> Result<(), PatchError> {
    let object = patch.as_object().ok_or(PatchError::NotAnObject)?;
    let mut entries = Vec::new();
    flatten("", object, &mut entries)?;

    let mut patched = submission.clone();
    for (field, value) in entries {
        apply_field(&mut patched, field, value)?;
    }
    *submission = patched;
    Ok(())
}

fn flatten<'a>(
    prefix: &str,
    object: &'a Map<String, Value>,
    out: &mut Vec<(Field, &'a Value)>,
) -> Result<(), PatchError> {
    for (key, value) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match (Field::from_path(&path), value) {
            (Some(field), _) => out.push((field, value)),
            (None, Value::Object(nested)) => flatten(&path, nested, out)?,
            (None, _) => return Err(PatchError::UnknownField(path)),
        }
    }
    Ok(())
}

fn apply_field(case: &mut CaseSubmission, field: Field, value: &Value) -> Result<(), PatchError> {
    match field {
        Field::DoctorName => case.doctor.name = text(field, value)?.unwrap_or_default(),
        Field::PracticeName => case.doctor.practice_name = text(field, value)?.unwrap_or_default(),
        Field::DoctorEmail => case.doctor.email = text(field, value)?.unwrap_or_default(),
        Field::DoctorPhone => case.doctor.phone = text(field, value)?.unwrap_or_default(),
        Field::PatientIdentifier => {
            case.patient_identifier = text(field, value)?.unwrap_or_default()
        }
        Field::ApplianceCategory => {
            case.appliance_category = match non_empty(field, value)? {
                None => None,
                Some(raw) => Some(ApplianceCategory::parse_choice(&raw).ok_or(
                    PatchError::UnknownChoice {
                        path: field.path(),
                        value: raw,
                    },
                )?),
            }
        }
        Field::SleepApplianceType
        | Field::OrthoApplianceType
        | Field::CrownType
        | Field::AlignerType => {
            let Some(category) = field.detail_category() else {
                return Err(PatchError::UnknownField(field.path().to_string()));
            };
            match non_empty(field, value)? {
                None => case.appliance_detail.clear(category),
                Some(raw) => {
                    let selection = ApplianceSelection::parse(category, &raw).ok_or(
                        PatchError::UnknownChoice {
                            path: field.path(),
                            value: raw,
                        },
                    )?;
                    case.appliance_detail.store(selection);
                }
            }
        }
        Field::SpecialInstructions => case.special_instructions = non_empty(field, value)?,
        Field::RushOrder => {
            case.rush_order = match value {
                Value::Null => false,
                Value::Bool(flag) => *flag,
                _ => {
                    return Err(PatchError::TypeMismatch {
                        path: field.path(),
                        expected: "a boolean",
                    });
                }
            }
        }
        Field::RequestedDeliveryDate => {
            case.requested_delivery_date = match non_empty(field, value)? {
                None => None,
                Some(raw) => Some(parse_date(&raw).map_err(|_| PatchError::InvalidDate {
                    path: field.path(),
                    value: raw,
                })?),
            }
        }
    }
    Ok(())
}

fn text(field: Field, value: &Value) -> Result<Option<String>, PatchError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        _ => Err(PatchError::TypeMismatch {
            path: field.path(),
            expected: "a string",
        }),
    }
}

fn non_empty(field: Field, value: &Value) -> Result<Option<String>, PatchError> {
    Ok(text(field, value)?.filter(|text| !text.trim().is_empty()))
}
