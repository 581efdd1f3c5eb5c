use std::fmt::Write as _;

use case_form::{AttachmentList, CaseSubmission, Choice, WizardStep, format_date, format_file_size};

use crate::CaseWizard;

const NOT_PROVIDED: &str = "(not provided)";

/// Plain-text summary shown on the review step.
pub fn render_review(wizard: &CaseWizard) -> String {
    render(wizard.case(), wizard.attachments())
}

fn render(case: &CaseSubmission, attachments: &AttachmentList) -> String {
    let mut out = String::new();
    let doctor = &case.doctor;

    let _ = writeln!(out, "{}", WizardStep::DoctorPatient.title());
    line(&mut out, "Doctor", &doctor.name);
    line(&mut out, "Practice", &doctor.practice_name);
    line(&mut out, "Email", &doctor.email);
    line(&mut out, "Phone", &doctor.phone);
    line(&mut out, "Patient", &case.patient_identifier);

    let _ = writeln!(out, "\n{}", WizardStep::Appliance.title());
    line(
        &mut out,
        "Category",
        case.appliance_category.map_or("", Choice::label),
    );
    line(
        &mut out,
        "Type",
        case.selection()
            .map_or("", |selection| selection.detail_label()),
    );
    if let Some(instructions) = case
        .special_instructions
        .as_deref()
        .filter(|text| !text.trim().is_empty())
    {
        line(&mut out, "Special instructions", instructions);
    }
    line(
        &mut out,
        "Rush order",
        if case.rush_order { "Yes" } else { "No" },
    );
    let delivery = case
        .requested_delivery_date
        .map(format_date)
        .unwrap_or_else(|| "Not specified".to_string());
    line(&mut out, "Requested delivery", &delivery);

    let _ = writeln!(
        out,
        "\n{} ({})",
        WizardStep::Files.title(),
        attachments.len()
    );
    if attachments.is_empty() {
        let _ = writeln!(out, "  No files attached");
    }
    for attachment in attachments.iter() {
        let _ = writeln!(
            out,
            "  {} ({})",
            attachment.name,
            format_file_size(attachment.size_bytes)
        );
    }
    out
}

fn line(out: &mut String, label: &str, value: &str) {
    let value = value.trim();
    let value = if value.is_empty() { NOT_PROVIDED } else { value };
    let _ = writeln!(out, "  {label}: {value}");
}
