use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed set of options rendered as a single select input.
///
/// `value` is the wire form stored in payloads; `label` is what the select
/// shows. Parsing accepts either, ignoring ASCII case.
pub trait Choice: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn value(self) -> &'static str;

    fn label(self) -> &'static str;

    fn aliases(self) -> &'static [&'static str] {
        &[]
    }

    fn parse_choice(input: &str) -> Option<Self> {
        let needle = input.trim();
        Self::ALL.iter().copied().find(|choice| {
            choice.value().eq_ignore_ascii_case(needle)
                || choice.label().eq_ignore_ascii_case(needle)
                || choice
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(needle))
        })
    }
}

/// Top-level appliance classification; decides which detail field is required.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum ApplianceCategory {
    #[serde(rename = "sleep")]
    Sleep,
    #[serde(rename = "ortho")]
    Orthodontic,
    #[serde(rename = "crown")]
    CrownBridge,
    #[serde(rename = "aligner")]
    Aligner,
}

impl Choice for ApplianceCategory {
    const ALL: &'static [Self] = &[
        Self::Sleep,
        Self::Orthodontic,
        Self::CrownBridge,
        Self::Aligner,
    ];

    fn value(self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Orthodontic => "ortho",
            Self::CrownBridge => "crown",
            Self::Aligner => "aligner",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Sleep => "Sleep Solutions",
            Self::Orthodontic => "Orthodontic Products",
            Self::CrownBridge => "Crown & Bridge",
            Self::Aligner => "Clear Aligners",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Sleep => &[],
            Self::Orthodontic => &["orthodontic"],
            Self::CrownBridge => &["crownbridge", "crown_bridge", "crown-bridge"],
            Self::Aligner => &["aligners"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SleepAppliance {
    Dorsal,
    Ema,
    Herbst,
    Tap,
    #[serde(rename = "somnodent")]
    SomnoDent,
    Custom,
}

impl Choice for SleepAppliance {
    const ALL: &'static [Self] = &[
        Self::Dorsal,
        Self::Ema,
        Self::Herbst,
        Self::Tap,
        Self::SomnoDent,
        Self::Custom,
    ];

    fn value(self) -> &'static str {
        match self {
            Self::Dorsal => "dorsal",
            Self::Ema => "ema",
            Self::Herbst => "herbst",
            Self::Tap => "tap",
            Self::SomnoDent => "somnodent",
            Self::Custom => "custom",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Dorsal => "Dorsal Appliance",
            Self::Ema => "EMA Device",
            Self::Herbst => "Herbst Appliance",
            Self::Tap => "TAP Appliance",
            Self::SomnoDent => "SomnoDent",
            Self::Custom => "Custom Design",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrthoAppliance {
    Retainer,
    Fixed,
    Functional,
    Splint,
}

impl Choice for OrthoAppliance {
    const ALL: &'static [Self] = &[Self::Retainer, Self::Fixed, Self::Functional, Self::Splint];

    fn value(self) -> &'static str {
        match self {
            Self::Retainer => "retainer",
            Self::Fixed => "fixed",
            Self::Functional => "functional",
            Self::Splint => "splint",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Retainer => "Retainer",
            Self::Fixed => "Fixed Appliance",
            Self::Functional => "Functional Orthopedic",
            Self::Splint => "Splint/Night Guard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CrownType {
    Single,
    Multiple,
    Bridge,
    Implant,
}

impl Choice for CrownType {
    const ALL: &'static [Self] = &[Self::Single, Self::Multiple, Self::Bridge, Self::Implant];

    fn value(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::Bridge => "bridge",
            Self::Implant => "implant",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Single => "Single Unit",
            Self::Multiple => "Multiple Units",
            Self::Bridge => "Bridge",
            Self::Implant => "Implant Solution",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AlignerSystem {
    #[serde(rename = "gforce")]
    GForce,
    #[serde(rename = "gforce-plus")]
    GForcePlus,
    #[serde(rename = "gforce-pro")]
    GForcePro,
}

impl Choice for AlignerSystem {
    const ALL: &'static [Self] = &[Self::GForce, Self::GForcePlus, Self::GForcePro];

    fn value(self) -> &'static str {
        match self {
            Self::GForce => "gforce",
            Self::GForcePlus => "gforce-plus",
            Self::GForcePro => "gforce-pro",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::GForce => "G-Force System",
            Self::GForcePlus => "G-Force Plus",
            Self::GForcePro => "G-Force Pro",
        }
    }
}

/// Per-category detail slots held by the working form.
///
/// Every category keeps its own slot so that switching back to a previous
/// category restores the earlier pick. Only the slot of the active category
/// is ever read, see [`ApplianceDetails::selection`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_appliance_type: Option<SleepAppliance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ortho_appliance_type: Option<OrthoAppliance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crown_type: Option<CrownType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aligner_type: Option<AlignerSystem>,
}

impl ApplianceDetails {
    /// Reads the slot belonging to `category` and nothing else.
    pub fn selection(&self, category: ApplianceCategory) -> Option<ApplianceSelection> {
        match category {
            ApplianceCategory::Sleep => self
                .sleep_appliance_type
                .map(|sleep_appliance_type| ApplianceSelection::Sleep {
                    sleep_appliance_type,
                }),
            ApplianceCategory::Orthodontic => self
                .ortho_appliance_type
                .map(|ortho_appliance_type| ApplianceSelection::Orthodontic {
                    ortho_appliance_type,
                }),
            ApplianceCategory::CrownBridge => self
                .crown_type
                .map(|crown_type| ApplianceSelection::CrownBridge { crown_type }),
            ApplianceCategory::Aligner => self
                .aligner_type
                .map(|aligner_type| ApplianceSelection::Aligner { aligner_type }),
        }
    }

    pub fn store(&mut self, selection: ApplianceSelection) {
        match selection {
            ApplianceSelection::Sleep {
                sleep_appliance_type,
            } => self.sleep_appliance_type = Some(sleep_appliance_type),
            ApplianceSelection::Orthodontic {
                ortho_appliance_type,
            } => self.ortho_appliance_type = Some(ortho_appliance_type),
            ApplianceSelection::CrownBridge { crown_type } => self.crown_type = Some(crown_type),
            ApplianceSelection::Aligner { aligner_type } => self.aligner_type = Some(aligner_type),
        }
    }

    pub fn clear(&mut self, category: ApplianceCategory) {
        match category {
            ApplianceCategory::Sleep => self.sleep_appliance_type = None,
            ApplianceCategory::Orthodontic => self.ortho_appliance_type = None,
            ApplianceCategory::CrownBridge => self.crown_type = None,
            ApplianceCategory::Aligner => self.aligner_type = None,
        }
    }
}

/// The appliance as it travels in a submission payload: the category tag plus
/// the one detail field that category requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "applianceCategory", content = "applianceDetail")]
pub enum ApplianceSelection {
    #[serde(rename = "sleep")]
    Sleep {
        #[serde(rename = "sleepApplianceType")]
        sleep_appliance_type: SleepAppliance,
    },
    #[serde(rename = "ortho")]
    Orthodontic {
        #[serde(rename = "orthoApplianceType")]
        ortho_appliance_type: OrthoAppliance,
    },
    #[serde(rename = "crown")]
    CrownBridge {
        #[serde(rename = "crownType")]
        crown_type: CrownType,
    },
    #[serde(rename = "aligner")]
    Aligner {
        #[serde(rename = "alignerType")]
        aligner_type: AlignerSystem,
    },
}

impl ApplianceSelection {
    pub fn category(&self) -> ApplianceCategory {
        match self {
            Self::Sleep { .. } => ApplianceCategory::Sleep,
            Self::Orthodontic { .. } => ApplianceCategory::Orthodontic,
            Self::CrownBridge { .. } => ApplianceCategory::CrownBridge,
            Self::Aligner { .. } => ApplianceCategory::Aligner,
        }
    }

    pub fn detail_label(&self) -> &'static str {
        match *self {
            Self::Sleep {
                sleep_appliance_type,
            } => sleep_appliance_type.label(),
            Self::Orthodontic {
                ortho_appliance_type,
            } => ortho_appliance_type.label(),
            Self::CrownBridge { crown_type } => crown_type.label(),
            Self::Aligner { aligner_type } => aligner_type.label(),
        }
    }

    /// Parses a detail choice for `category` from its wire value or label.
    pub fn parse(category: ApplianceCategory, input: &str) -> Option<Self> {
        match category {
            ApplianceCategory::Sleep => {
                SleepAppliance::parse_choice(input).map(|sleep_appliance_type| Self::Sleep {
                    sleep_appliance_type,
                })
            }
            ApplianceCategory::Orthodontic => OrthoAppliance::parse_choice(input).map(
                |ortho_appliance_type| Self::Orthodontic {
                    ortho_appliance_type,
                },
            ),
            ApplianceCategory::CrownBridge => {
                CrownType::parse_choice(input).map(|crown_type| Self::CrownBridge { crown_type })
            }
            ApplianceCategory::Aligner => AlignerSystem::parse_choice(input)
                .map(|aligner_type| Self::Aligner { aligner_type }),
        }
    }
}
