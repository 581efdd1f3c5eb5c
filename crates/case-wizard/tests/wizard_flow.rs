use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use case_form::{CandidateFile, Field, UploadPolicy, WizardStep};
use case_wizard::{
    CaseSubmitter, CaseWizard, Phase, SimulatedSubmitter, SubmissionPayload, SubmissionReceipt,
    SubmitError, WizardError,
};
use serde_json::json;
use time::Date;
use time::macros::{date, datetime};

fn fixed_today() -> Date {
    date!(2026 - 10 - 16)
}

fn wizard() -> CaseWizard {
    CaseWizard::new(UploadPolicy::default()).with_clock(fixed_today)
}

fn fill_doctor(wizard: &mut CaseWizard) {
    wizard
        .apply_patch(&json!({
            "doctor": {
                "name": "Dr. Ana Ruiz",
                "practiceName": "Ruiz Family Dental",
                "email": "ana@ruizdental.example",
                "phone": "555-0100"
            },
            "patientIdentifier": "PT-0042"
        }))
        .unwrap();
}

fn fill_sleep_ema(wizard: &mut CaseWizard) {
    wizard
        .apply_patch(&json!({
            "applianceCategory": "sleep",
            "applianceDetail.sleepApplianceType": "EMA Device"
        }))
        .unwrap();
}

fn ready_for_review() -> CaseWizard {
    let mut wizard = wizard();
    fill_doctor(&mut wizard);
    wizard.advance().unwrap();
    fill_sleep_ema(&mut wizard);
    wizard.advance().unwrap();
    wizard
        .add_files(vec![CandidateFile::new("scan.stl", 2 * 1024 * 1024)])
        .unwrap();
    wizard.advance().unwrap();
    wizard
}

/// Records every payload and answers with a fixed outcome.
struct ScriptedSubmitter {
    outcome: Result<SubmissionReceipt, SubmitError>,
    calls: AtomicUsize,
}

impl ScriptedSubmitter {
    fn new(outcome: Result<SubmissionReceipt, SubmitError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CaseSubmitter for ScriptedSubmitter {
    async fn submit(&self, _payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

fn receipt() -> SubmissionReceipt {
    SubmissionReceipt {
        reference: "LAB-0001".into(),
        submitted_at: datetime!(2026-10-16 12:00 UTC),
    }
}

#[test]
fn initial_state() {
    let wizard = wizard();
    assert_eq!(wizard.step(), WizardStep::DoctorPatient);
    assert_eq!(wizard.phase(), Phase::Editing);
    assert!(wizard.attachments().is_empty());
    assert!(wizard.last_error().is_none());
    assert!(!wizard.can_advance());
}

#[test]
fn advance_is_gated_on_the_current_step() {
    let mut wizard = wizard();
    let err = wizard.advance().unwrap_err();
    match err {
        WizardError::StepInvalid { step, errors } => {
            assert_eq!(step, WizardStep::DoctorPatient);
            assert!(errors.contains(Field::DoctorName));
            assert!(!errors.contains(Field::ApplianceCategory));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(wizard.step(), WizardStep::DoctorPatient);

    fill_doctor(&mut wizard);
    assert_eq!(wizard.advance().unwrap(), WizardStep::Appliance);
    assert!(matches!(
        wizard.advance(),
        Err(WizardError::StepInvalid {
            step: WizardStep::Appliance,
            ..
        })
    ));
}

#[test]
fn advance_stops_at_review() {
    let mut wizard = ready_for_review();
    assert_eq!(wizard.step(), WizardStep::Review);
    assert_eq!(wizard.advance().unwrap(), WizardStep::Review);
}

#[test]
fn retreat_then_advance_keeps_values() {
    let mut wizard = ready_for_review();
    let before = wizard.case().clone();
    assert_eq!(wizard.retreat().unwrap(), WizardStep::Files);
    assert_eq!(wizard.retreat().unwrap(), WizardStep::Appliance);
    assert_eq!(wizard.retreat().unwrap(), WizardStep::DoctorPatient);
    assert_eq!(wizard.retreat().unwrap(), WizardStep::DoctorPatient);
    for _ in 0..3 {
        wizard.advance().unwrap();
    }
    assert_eq!(wizard.step(), WizardStep::Review);
    assert_eq!(wizard.case(), &before);
    assert_eq!(wizard.attachments().names(), vec!["scan.stl"]);
}

#[test]
fn retreat_ignores_invalid_fields() {
    let mut wizard = wizard();
    fill_doctor(&mut wizard);
    wizard.advance().unwrap();
    wizard.edit(|case| case.doctor.email.clear()).unwrap();
    assert_eq!(wizard.retreat().unwrap(), WizardStep::DoctorPatient);
    assert_eq!(
        wizard.step_errors().message(Field::DoctorEmail),
        Some("Email is required")
    );
}

#[test]
fn errors_refresh_after_every_edit() {
    let mut wizard = wizard();
    fill_doctor(&mut wizard);
    fill_sleep_ema(&mut wizard);
    assert!(wizard.errors().is_empty());

    let errors = wizard
        .apply_patch(&json!({ "applianceCategory": "aligner" }))
        .unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.message(Field::AlignerType),
        Some("Please select an aligner system")
    );

    // Switching back restores the earlier pick.
    let errors = wizard
        .apply_patch(&json!({ "applianceCategory": "sleep" }))
        .unwrap();
    assert!(errors.is_empty());
}

#[test]
fn past_delivery_date_blocks_the_appliance_step() {
    let mut wizard = wizard();
    fill_doctor(&mut wizard);
    wizard.advance().unwrap();
    fill_sleep_ema(&mut wizard);
    wizard
        .apply_patch(&json!({ "requestedDeliveryDate": "2026-10-15" }))
        .unwrap();
    assert!(wizard.advance().is_err());
    wizard
        .apply_patch(&json!({ "requestedDeliveryDate": "2026-10-16" }))
        .unwrap();
    assert_eq!(wizard.advance().unwrap(), WizardStep::Files);
}

static DAYS_ELAPSED: AtomicI64 = AtomicI64::new(0);

fn moving_today() -> Date {
    fixed_today() + time::Duration::days(DAYS_ELAPSED.load(Ordering::SeqCst))
}

#[test]
fn delivery_date_lapsing_overnight_blocks_advance() {
    let mut wizard = CaseWizard::new(UploadPolicy::default()).with_clock(moving_today);
    fill_doctor(&mut wizard);
    wizard.advance().unwrap();
    fill_sleep_ema(&mut wizard);
    wizard
        .apply_patch(&json!({ "requestedDeliveryDate": "2026-10-16" }))
        .unwrap();
    assert!(wizard.can_advance());

    DAYS_ELAPSED.store(1, Ordering::SeqCst);
    assert!(!wizard.can_advance());
    match wizard.advance() {
        Err(WizardError::StepInvalid { step, errors }) => {
            assert_eq!(step, WizardStep::Appliance);
            assert_eq!(
                errors.message(Field::RequestedDeliveryDate),
                Some("Delivery date cannot be in the past")
            );
        }
        other => panic!("expected the lapsed date to block, got {other:?}"),
    }
    assert_eq!(wizard.step(), WizardStep::Appliance);
    assert!(wizard.errors().get(Field::RequestedDeliveryDate).is_some());
}

#[test]
fn invalid_patch_is_reported_without_changes() {
    let mut wizard = wizard();
    fill_doctor(&mut wizard);
    let before = wizard.case().clone();
    let err = wizard
        .apply_patch(&json!({ "doctor.name": "Dr. X", "rushOrder": "soon" }))
        .unwrap_err();
    assert!(matches!(err, WizardError::Patch(_)));
    assert_eq!(wizard.case(), &before);
}

#[test]
fn upload_rejection_is_kept_until_next_batch() {
    let mut wizard = wizard();
    let reason = wizard
        .add_files(vec![CandidateFile::new("setup.exe", 10)])
        .unwrap()
        .cloned();
    assert!(reason.unwrap().to_string().contains("Accepted formats"));
    assert!(wizard.upload_rejection().is_some());

    assert!(
        wizard
            .add_files(vec![CandidateFile::new("scan.stl", 10)])
            .unwrap()
            .is_none()
    );
    assert!(wizard.upload_rejection().is_none());
    assert_eq!(wizard.remove_file(5).unwrap(), None);
    assert_eq!(wizard.remove_file(0).unwrap().unwrap().name, "scan.stl");
}

#[test]
fn single_file_wizard_reports_the_limit() {
    let mut wizard = CaseWizard::new(UploadPolicy::default().single_file());
    let reason = wizard
        .add_files(vec![
            CandidateFile::new("first.stl", 1),
            CandidateFile::new("second.stl", 1),
        ])
        .unwrap()
        .map(ToString::to_string);
    assert_eq!(reason.as_deref(), Some("Only one file allowed"));
    assert_eq!(wizard.attachments().names(), vec!["first.stl"]);
}

#[tokio::test]
async fn sleep_ema_case_with_scan_submits() {
    let mut wizard = ready_for_review();
    let payload = wizard.begin_submission().unwrap();
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value["case"]["applianceCategory"], "sleep");
    assert_eq!(value["case"]["applianceDetail"]["sleepApplianceType"], "ema");
    assert_eq!(value["attachments"][0]["name"], "scan.stl");
    assert_eq!(value["attachments"][0]["sizeBytes"], 2_097_152);
    assert_eq!(value["attachments"].as_array().unwrap().len(), 1);

    let receipt = SimulatedSubmitter::new(Duration::from_millis(5))
        .submit(&payload)
        .await;
    let receipt = wizard.finish_submission(receipt).unwrap();
    assert_eq!(wizard.phase(), Phase::Submitted);
    assert_eq!(wizard.receipt(), Some(&receipt));
    assert!(wizard.attachments().is_empty());
    assert_eq!(wizard.case(), &case_form::CaseSubmission::default());
}

#[tokio::test]
async fn submit_requires_a_complete_case() {
    let mut wizard = wizard();
    fill_doctor(&mut wizard);
    let submitter = ScriptedSubmitter::new(Ok(receipt()));
    let err = wizard.submit(&submitter).await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::StepInvalid {
            step: WizardStep::Appliance,
            ..
        }
    ));
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    assert_eq!(wizard.phase(), Phase::Editing);
}

#[tokio::test]
async fn failed_submission_preserves_everything() {
    let mut wizard = ready_for_review();
    let before = wizard.case().clone();
    let submitter = ScriptedSubmitter::new(Err(SubmitError::Rejected {
        status: 503,
        body: "maintenance".into(),
    }));

    let err = wizard.submit(&submitter).await.unwrap_err();
    assert!(matches!(err, WizardError::Submit(SubmitError::Rejected { status: 503, .. })));
    assert_eq!(wizard.phase(), Phase::Editing);
    assert_eq!(wizard.step(), WizardStep::Review);
    assert_eq!(wizard.case(), &before);
    assert_eq!(wizard.attachments().names(), vec!["scan.stl"]);
    assert!(wizard.last_error().unwrap().to_string().contains("503"));

    let retry = ScriptedSubmitter::new(Ok(receipt()));
    let receipt = wizard.submit(&retry).await.unwrap();
    assert_eq!(receipt.reference, "LAB-0001");
    assert!(wizard.last_error().is_none());
}

#[test]
fn in_flight_submission_rejects_repeats_and_edits() {
    let mut wizard = ready_for_review();
    wizard.begin_submission().unwrap();
    assert_eq!(wizard.phase(), Phase::Submitting);
    assert!(matches!(
        wizard.begin_submission(),
        Err(WizardError::SubmissionInFlight)
    ));
    assert!(matches!(
        wizard.edit(|case| case.rush_order = true),
        Err(WizardError::SubmissionInFlight)
    ));
    assert!(matches!(
        wizard.add_files(vec![CandidateFile::new("more.pdf", 1)]),
        Err(WizardError::SubmissionInFlight)
    ));
    assert!(!wizard.case().rush_order);
}

#[test]
fn submitted_wizard_rejects_mutations() {
    let mut wizard = ready_for_review();
    wizard.begin_submission().unwrap();
    wizard.finish_submission(Ok(receipt())).unwrap();
    assert!(matches!(
        wizard.apply_patch(&json!({ "doctor.name": "again" })),
        Err(WizardError::AlreadySubmitted)
    ));
    assert!(matches!(wizard.retreat(), Err(WizardError::AlreadySubmitted)));
    assert!(matches!(
        wizard.remove_file(0),
        Err(WizardError::AlreadySubmitted)
    ));
    assert!(matches!(
        wizard.finish_submission(Ok(receipt())),
        Err(WizardError::AlreadySubmitted)
    ));
}

#[test]
fn finishing_without_beginning_is_an_error() {
    let mut wizard = wizard();
    assert!(matches!(
        wizard.finish_submission(Ok(receipt())),
        Err(WizardError::NotSubmitting)
    ));
}
