#![allow(missing_docs)]

//! Four-step controller for submitting a lab case.
//!
//! [`CaseWizard`] owns the working [`CaseSubmission`] and its attachments,
//! gates forward navigation on the fields of the steps seen so far, and runs
//! a single submission attempt at a time through a [`CaseSubmitter`].

pub mod review;
pub mod submit;

use case_form::{
    Attachment, AttachmentList, CandidateFile, CaseSubmission, Field, PatchError,
    RejectionReason, UploadPolicy, ValidationErrorSet, ValidationScope, WizardStep, today_utc,
    validate_at,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::Date;
use tracing::{debug, info, warn};

pub use review::render_review;
pub use submit::{
    CaseSubmitter, DEFAULT_HTTP_TIMEOUT, DEFAULT_SIMULATED_DELAY, HttpSubmitter,
    SimulatedSubmitter, SubmissionPayload, SubmissionReceipt, SubmitError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Editing,
    Submitting,
    Submitted,
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("case has already been submitted")]
    AlreadySubmitted,
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("no submission is in progress")]
    NotSubmitting,
    #[error("step {} ({}) is incomplete: {errors}", .step.number(), .step.title())]
    StepInvalid {
        step: WizardStep,
        errors: ValidationErrorSet,
    },
    #[error("invalid patch: {0}")]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

pub struct CaseWizard {
    case: CaseSubmission,
    attachments: AttachmentList,
    policy: UploadPolicy,
    step: WizardStep,
    phase: Phase,
    errors: ValidationErrorSet,
    upload_rejection: Option<RejectionReason>,
    last_error: Option<SubmitError>,
    receipt: Option<SubmissionReceipt>,
    clock: fn() -> Date,
}

impl Default for CaseWizard {
    fn default() -> Self {
        Self::new(UploadPolicy::default())
    }
}

impl CaseWizard {
    pub fn new(policy: UploadPolicy) -> Self {
        let mut wizard = Self {
            case: CaseSubmission::default(),
            attachments: AttachmentList::new(),
            policy,
            step: WizardStep::FIRST,
            phase: Phase::Editing,
            errors: ValidationErrorSet::new(),
            upload_rejection: None,
            last_error: None,
            receipt: None,
            clock: today_utc,
        };
        wizard.revalidate();
        wizard
    }

    /// Replaces the source of "today" used for the delivery-date rule.
    pub fn with_clock(mut self, clock: fn() -> Date) -> Self {
        self.clock = clock;
        self.revalidate();
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn case(&self) -> &CaseSubmission {
        &self.case
    }

    pub fn attachments(&self) -> &AttachmentList {
        &self.attachments
    }

    /// Current errors across every field.
    pub fn errors(&self) -> &ValidationErrorSet {
        &self.errors
    }

    /// Errors of the fields shown on the current step.
    pub fn step_errors(&self) -> ValidationErrorSet {
        self.errors.scoped(ValidationScope::Step(self.step))
    }

    /// Reason the most recent file batch was partly or wholly refused.
    pub fn upload_rejection(&self) -> Option<&RejectionReason> {
        self.upload_rejection.as_ref()
    }

    pub fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    /// Whether every field up to and including the current step is valid
    /// as of the clock's current date.
    pub fn can_advance(&self) -> bool {
        validate_at(&self.case, (self.clock)())
            .scoped(ValidationScope::UpToStep(self.step))
            .is_empty()
    }

    /// Moves one step forward when the steps so far are valid. Stays put on
    /// the last step.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_editing()?;
        // The delivery date can lapse between edits.
        self.revalidate();
        let blocking = self.errors.scoped(ValidationScope::UpToStep(self.step));
        if !blocking.is_empty() {
            debug!(step = self.step.number(), errors = blocking.len(), "advance blocked");
            return Err(WizardError::StepInvalid {
                step: first_failing_step(&blocking).unwrap_or(self.step),
                errors: blocking,
            });
        }
        if let Some(next) = self.step.next() {
            debug!(from = self.step.number(), to = next.number(), "advanced");
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves one step back. Never validates and never discards data.
    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_editing()?;
        if let Some(previous) = self.step.previous() {
            debug!(from = self.step.number(), to = previous.number(), "retreated");
            self.step = previous;
        }
        Ok(self.step)
    }

    /// Mutates the working case and refreshes the error set.
    pub fn edit(
        &mut self,
        change: impl FnOnce(&mut CaseSubmission),
    ) -> Result<&ValidationErrorSet, WizardError> {
        self.ensure_editing()?;
        change(&mut self.case);
        self.revalidate();
        Ok(&self.errors)
    }

    /// Applies a `field path -> value` JSON object; see [`case_form::apply_patch`].
    pub fn apply_patch(&mut self, patch: &Value) -> Result<&ValidationErrorSet, WizardError> {
        self.ensure_editing()?;
        case_form::apply_patch(&mut self.case, patch)?;
        self.revalidate();
        Ok(&self.errors)
    }

    /// Screens a batch of picked or dropped files against the wizard's policy.
    pub fn add_files(
        &mut self,
        candidates: Vec<CandidateFile>,
    ) -> Result<Option<&RejectionReason>, WizardError> {
        self.ensure_editing()?;
        self.upload_rejection = self.attachments.accept(candidates, &self.policy);
        Ok(self.upload_rejection.as_ref())
    }

    pub fn remove_file(&mut self, index: usize) -> Result<Option<Attachment>, WizardError> {
        self.ensure_editing()?;
        Ok(self.attachments.remove(index))
    }

    /// Validates everything, freezes the wizard and returns the payload to
    /// send. Must be followed by [`Self::finish_submission`].
    pub fn begin_submission(&mut self) -> Result<SubmissionPayload, WizardError> {
        self.ensure_editing()?;
        let case = self.case.validated((self.clock)()).map_err(|errors| {
            let step = first_failing_step(&errors).unwrap_or(self.step);
            self.errors = errors.clone();
            WizardError::StepInvalid { step, errors }
        })?;
        self.phase = Phase::Submitting;
        self.last_error = None;
        debug!(attachments = self.attachments.len(), "submission started");
        Ok(SubmissionPayload {
            case,
            attachments: self.attachments.as_slice().to_vec(),
        })
    }

    /// Resolves the in-flight submission. Success discards the working data
    /// and keeps the receipt. Failure returns to editing with everything
    /// intact and records the error.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionReceipt, SubmitError>,
    ) -> Result<SubmissionReceipt, WizardError> {
        if self.phase != Phase::Submitting {
            return Err(match self.phase {
                Phase::Submitted => WizardError::AlreadySubmitted,
                _ => WizardError::NotSubmitting,
            });
        }
        match outcome {
            Ok(receipt) => {
                info!(reference = %receipt.reference, "case submitted");
                self.phase = Phase::Submitted;
                self.case = CaseSubmission::default();
                self.attachments = AttachmentList::new();
                self.errors = ValidationErrorSet::new();
                self.upload_rejection = None;
                self.receipt = Some(receipt.clone());
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, "case submission failed");
                self.phase = Phase::Editing;
                self.last_error = Some(err.clone());
                Err(WizardError::Submit(err))
            }
        }
    }

    /// Runs one submission attempt through `submitter`.
    pub async fn submit<S>(&mut self, submitter: &S) -> Result<SubmissionReceipt, WizardError>
    where
        S: CaseSubmitter + ?Sized,
    {
        let payload = self.begin_submission()?;
        let outcome = submitter.submit(&payload).await;
        self.finish_submission(outcome)
    }

    fn ensure_editing(&self) -> Result<(), WizardError> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Submitting => Err(WizardError::SubmissionInFlight),
            Phase::Submitted => Err(WizardError::AlreadySubmitted),
        }
    }

    fn revalidate(&mut self) {
        self.errors = validate_at(&self.case, (self.clock)());
    }
}

fn first_failing_step(errors: &ValidationErrorSet) -> Option<WizardStep> {
    errors.fields().map(Field::step).min()
}
