#![allow(missing_docs)]

pub mod answers;
pub mod attachments;
pub mod case;
pub mod fields;
pub mod patch;
pub mod payment;
pub mod validate;

pub use answers::{ErrorSet, FieldKey, ValidationError, ValidationErrorSet};
pub use attachments::{
    AcceptPattern, Attachment, AttachmentList, CandidateFile, MediaKind, RejectionReason,
    Screening, UploadPolicy, format_file_size, screen,
};
pub use case::{
    AlignerSystem, ApplianceCategory, ApplianceDetails, ApplianceSelection, CaseSubmission,
    Choice, CrownType, DoctorInfo, OrthoAppliance, SleepAppliance, ValidatedCase, format_date,
    parse_date,
};
pub use fields::{Field, ValidationScope, WizardStep};
pub use patch::{PatchError, apply_patch};
pub use payment::{PaymentErrors, PaymentField, PaymentForm, validate_payment};
pub use validate::{EMAIL_PATTERN, is_email, today_utc, validate, validate_at, validate_scoped};
