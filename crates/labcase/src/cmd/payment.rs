use std::path::PathBuf;

use anyhow::{Result, bail};
use case_form::{PaymentForm, validate_payment};
use clap::Args;

use super::{print_json, read_json};

#[derive(Args, Debug, Clone)]
pub struct PaymentArgs {
    /// Payment form as a camelCase JSON object
    #[arg(long, value_name = "payment.json")]
    pub answers: PathBuf,
}

pub fn run(args: &PaymentArgs) -> Result<()> {
    let form: PaymentForm = read_json(&args.answers, "payment form")?;
    let errors = validate_payment(&form);
    print_json(&errors)?;
    if !errors.is_empty() {
        bail!("{} payment field(s) failed validation", errors.len());
    }
    Ok(())
}
