use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use case_form::{CandidateFile, FieldKey, WizardStep};
use case_wizard::{
    CaseSubmitter, CaseWizard, HttpSubmitter, SimulatedSubmitter, SubmissionReceipt, WizardError,
    render_review,
};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{print_json, read_json};
use crate::config::LabConfig;

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Case answers as a JSON object of field path -> value
    #[arg(long, value_name = "answers.json")]
    pub answers: PathBuf,
    /// Attach a file; repeat for several files
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,
    #[arg(long, value_name = "config.toml")]
    pub config: Option<PathBuf>,
    /// Use the simulated lab even when an endpoint is configured
    #[arg(long)]
    pub simulate: bool,
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitOutput<'a> {
    receipt: &'a SubmissionReceipt,
    attachments: &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

pub fn run(args: SubmitArgs) -> Result<()> {
    let config = LabConfig::load(args.config.as_deref())?;
    let answers: Value = read_json(&args.answers, "answers")?;
    let mut candidates = args
        .files
        .iter()
        .map(|path| read_candidate(path))
        .collect::<Result<Vec<_>>>()?;

    let mut wizard = CaseWizard::new(config.upload_policy());
    wizard
        .apply_patch(&answers)
        .with_context(|| format!("answers {} do not fit the case form", args.answers.display()))?;

    let mut warnings = Vec::new();
    while wizard.step() != WizardStep::LAST {
        if wizard.step() == WizardStep::Files
            && !candidates.is_empty()
            && let Some(reason) = wizard.add_files(std::mem::take(&mut candidates))?
        {
            warnings.push(reason.to_string());
        }
        advance(&mut wizard)?;
    }
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let review = render_review(&wizard);
    let attachment_names: Vec<String> = wizard
        .attachments()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let submitter: Box<dyn CaseSubmitter> = match config.endpoint()? {
        Some(endpoint) if !args.simulate => {
            info!(%endpoint, "submitting to lab endpoint");
            Box::new(HttpSubmitter::new(endpoint, config.timeout())?)
        }
        _ => Box::new(SimulatedSubmitter::new(config.simulated_delay())),
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let receipt = runtime
        .block_on(wizard.submit(submitter.as_ref()))
        .context("case submission failed")?;

    if args.json {
        print_json(&SubmitOutput {
            receipt: &receipt,
            attachments: &attachment_names,
            warnings,
        })
    } else {
        print!("{review}");
        println!("\nSubmitted case {}", receipt.reference);
        Ok(())
    }
}

fn advance(wizard: &mut CaseWizard) -> Result<()> {
    match wizard.advance() {
        Ok(_) => Ok(()),
        Err(WizardError::StepInvalid { step, errors }) => {
            for (field, error) in errors.iter() {
                eprintln!("  {}: {}", field.path(), error.message);
            }
            bail!(
                "step {} ({}) has {} invalid field(s)",
                step.number(),
                step.title(),
                errors.len()
            )
        }
        Err(err) => Err(err.into()),
    }
}

fn read_candidate(path: &Path) -> Result<CandidateFile> {
    let content =
        fs::read(path).with_context(|| format!("failed to read attachment {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(CandidateFile::from_bytes(name, content))
}
