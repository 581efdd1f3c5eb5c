use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use case_form::{
    CaseSubmission, ValidationErrorSet, ValidationScope, WizardStep, apply_patch, today_utc,
    validate_at, validate_scoped,
};
use clap::Args;
use serde_json::Value;
use time::Date;

use super::{print_json, read_json};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Case answers as a JSON object of field path -> value
    #[arg(long, value_name = "answers.json")]
    pub answers: PathBuf,
    /// Only check the fields of steps 1 through N
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=4))]
    pub step: Option<u8>,
}

pub fn run(args: &ValidateArgs) -> Result<()> {
    let answers: Value = read_json(&args.answers, "answers")?;
    let errors = check(&answers, args.step.and_then(WizardStep::from_number), today_utc())
        .with_context(|| format!("answers {} do not fit the case form", args.answers.display()))?;
    print_json(&errors)?;
    if !errors.is_empty() {
        bail!("{} field(s) failed validation", errors.len());
    }
    Ok(())
}

/// Builds a case from `answers` and validates it, optionally up to `step`.
pub fn check(
    answers: &Value,
    step: Option<WizardStep>,
    today: Date,
) -> Result<ValidationErrorSet, case_form::PatchError> {
    let mut case = CaseSubmission::default();
    apply_patch(&mut case, answers)?;
    Ok(match step {
        Some(step) => validate_scoped(&case, ValidationScope::UpToStep(step), today),
        None => validate_at(&case, today),
    })
}
