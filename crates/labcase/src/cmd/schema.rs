use anyhow::Result;
use case_form::{CaseSubmission, PaymentForm};
use case_wizard::SubmissionPayload;
use clap::{Args, ValueEnum};
use schemars::schema_for;

use super::print_json;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(long, value_enum, default_value = "payload")]
    pub kind: SchemaKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// What the lab receives on submission
    Payload,
    /// The working case accepted by `--answers`
    Answers,
    Payment,
}

pub fn run(args: &SchemaArgs) -> Result<()> {
    let schema = match args.kind {
        SchemaKind::Payload => schema_for!(SubmissionPayload),
        SchemaKind::Answers => schema_for!(CaseSubmission),
        SchemaKind::Payment => schema_for!(PaymentForm),
    };
    print_json(&schema)
}
