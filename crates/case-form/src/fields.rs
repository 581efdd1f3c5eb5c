use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::FieldKey;
use crate::case::ApplianceCategory;

/// The four sequential phases of the case wizard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    DoctorPatient,
    Appliance,
    Files,
    Review,
}

impl WizardStep {
    pub const FIRST: Self = Self::DoctorPatient;
    pub const LAST: Self = Self::Review;
    pub const ALL: [Self; 4] = [
        Self::DoctorPatient,
        Self::Appliance,
        Self::Files,
        Self::Review,
    ];

    /// 1-based position shown in the progress header.
    pub fn number(self) -> u8 {
        match self {
            Self::DoctorPatient => 1,
            Self::Appliance => 2,
            Self::Files => 3,
            Self::Review => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == number)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::DoctorPatient => "Doctor & Patient",
            Self::Appliance => "Appliance",
            Self::Files => "Files",
            Self::Review => "Review",
        }
    }
}

/// Every validated field of a case, addressed by its dotted path.
///
/// Declaration order is form order, which is also the iteration order of
/// error sets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Field {
    #[serde(rename = "doctor.name")]
    DoctorName,
    #[serde(rename = "doctor.practiceName")]
    PracticeName,
    #[serde(rename = "doctor.email")]
    DoctorEmail,
    #[serde(rename = "doctor.phone")]
    DoctorPhone,
    #[serde(rename = "patientIdentifier")]
    PatientIdentifier,
    #[serde(rename = "applianceCategory")]
    ApplianceCategory,
    #[serde(rename = "applianceDetail.sleepApplianceType")]
    SleepApplianceType,
    #[serde(rename = "applianceDetail.orthoApplianceType")]
    OrthoApplianceType,
    #[serde(rename = "applianceDetail.crownType")]
    CrownType,
    #[serde(rename = "applianceDetail.alignerType")]
    AlignerType,
    #[serde(rename = "specialInstructions")]
    SpecialInstructions,
    #[serde(rename = "rushOrder")]
    RushOrder,
    #[serde(rename = "requestedDeliveryDate")]
    RequestedDeliveryDate,
}

impl Field {
    pub const ALL: [Self; 13] = [
        Self::DoctorName,
        Self::PracticeName,
        Self::DoctorEmail,
        Self::DoctorPhone,
        Self::PatientIdentifier,
        Self::ApplianceCategory,
        Self::SleepApplianceType,
        Self::OrthoApplianceType,
        Self::CrownType,
        Self::AlignerType,
        Self::SpecialInstructions,
        Self::RushOrder,
        Self::RequestedDeliveryDate,
    ];

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.path() == path)
    }

    /// Step whose "Next" button this field gates.
    pub fn step(self) -> WizardStep {
        match self {
            Self::DoctorName
            | Self::PracticeName
            | Self::DoctorEmail
            | Self::DoctorPhone
            | Self::PatientIdentifier => WizardStep::DoctorPatient,
            Self::ApplianceCategory
            | Self::SleepApplianceType
            | Self::OrthoApplianceType
            | Self::CrownType
            | Self::AlignerType
            | Self::SpecialInstructions
            | Self::RushOrder
            | Self::RequestedDeliveryDate => WizardStep::Appliance,
        }
    }

    /// The detail field a category makes mandatory.
    pub fn detail_for(category: ApplianceCategory) -> Self {
        match category {
            ApplianceCategory::Sleep => Self::SleepApplianceType,
            ApplianceCategory::Orthodontic => Self::OrthoApplianceType,
            ApplianceCategory::CrownBridge => Self::CrownType,
            ApplianceCategory::Aligner => Self::AlignerType,
        }
    }

    pub fn detail_category(self) -> Option<ApplianceCategory> {
        match self {
            Self::SleepApplianceType => Some(ApplianceCategory::Sleep),
            Self::OrthoApplianceType => Some(ApplianceCategory::Orthodontic),
            Self::CrownType => Some(ApplianceCategory::CrownBridge),
            Self::AlignerType => Some(ApplianceCategory::Aligner),
            _ => None,
        }
    }
}

impl FieldKey for Field {
    fn path(self) -> &'static str {
        match self {
            Self::DoctorName => "doctor.name",
            Self::PracticeName => "doctor.practiceName",
            Self::DoctorEmail => "doctor.email",
            Self::DoctorPhone => "doctor.phone",
            Self::PatientIdentifier => "patientIdentifier",
            Self::ApplianceCategory => "applianceCategory",
            Self::SleepApplianceType => "applianceDetail.sleepApplianceType",
            Self::OrthoApplianceType => "applianceDetail.orthoApplianceType",
            Self::CrownType => "applianceDetail.crownType",
            Self::AlignerType => "applianceDetail.alignerType",
            Self::SpecialInstructions => "specialInstructions",
            Self::RushOrder => "rushOrder",
            Self::RequestedDeliveryDate => "requestedDeliveryDate",
        }
    }
}

/// Subset of fields considered by one validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationScope {
    /// Fields owned by exactly this step.
    Step(WizardStep),
    /// Fields owned by this step and every step before it; used to gate "Next".
    UpToStep(WizardStep),
    /// Every field; used to gate the final submit.
    Full,
}

impl ValidationScope {
    pub fn includes(self, field: Field) -> bool {
        match self {
            Self::Step(step) => field.step() == step,
            Self::UpToStep(step) => field.step() <= step,
            Self::Full => true,
        }
    }
}
