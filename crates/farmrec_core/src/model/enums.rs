//! Shared enumerations for crab and pond records.
//!
//! # Responsibility
//! - Declare every enumerated attribute exactly once.
//! - Serve validation (`parse`), persistence (`as_str`) and UI option lists
//!   (`options`) from the same declaration.
//!
//! # Invariants
//! - `as_str` is the stored and wire value; `parse(as_str(v)) == Some(v)`.
//! - `VARIANTS` lists values in display order.

use serde::{Deserialize, Serialize};

/// Common behavior of an enumerated record attribute.
pub trait FieldEnum: Sized + Copy + 'static {
    /// All values in display order.
    const VARIANTS: &'static [Self];

    /// Stored/wire value.
    fn as_str(self) -> &'static str;

    /// Human-readable label. Defaults to the stored value.
    fn label(self) -> &'static str {
        self.as_str()
    }

    /// Parses an exact stored/wire value.
    fn parse(value: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.as_str() == value)
    }

    /// Builds the select option list for this enumeration.
    fn options() -> Vec<EnumOption> {
        Self::VARIANTS
            .iter()
            .map(|variant| EnumOption {
                value: variant.as_str(),
                label: variant.label(),
            })
            .collect()
    }
}

/// One `{value, label}` entry of a select option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnumOption {
    pub value: &'static str,
    pub label: &'static str,
}

macro_rules! field_enum {
    (@label $value:literal) => {
        $value
    };
    (@label $value:literal $label:literal) => {
        $label
    };
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $value:literal $(as $label:literal)?),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl FieldEnum for $name {
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => field_enum!(@label $value $($label)?),)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

field_enum! {
    /// Crab species. The farm currently raises a single species.
    Species {
        MudCrab => "Mud Crab",
    }
}

field_enum! {
    /// Unit attached to `Crab::age_value`.
    AgeUnit {
        Days => "days" as "Days",
        Weeks => "weeks" as "Weeks",
        Months => "months" as "Months",
    }
}

field_enum! {
    Gender {
        Male => "Male",
        Female => "Female",
        Undetermined => "Undetermined",
    }
}

field_enum! {
    HealthStatus {
        Healthy => "Healthy",
        Weak => "Weak",
        Diseased => "Diseased",
    }
}

field_enum! {
    /// Why a crab left the active stock.
    CrabRemovalReason {
        Sold => "Sold",
        Died => "Died",
        Harvested => "Harvested",
        Other => "Other",
    }
}

field_enum! {
    PondLocation {
        InlandBrackish => "Inland Brackish Pond Zone",
        Coastal => "Coastal Pond Zone",
        River => "River Pond Area",
    }
}

field_enum! {
    WaterType {
        Brackish => "Brackish",
        Fresh => "Fresh",
    }
}

field_enum! {
    /// Why a pond was taken out of service.
    PondRemovalReason {
        Decommissioned => "Decommissioned",
        Renovation => "Renovation",
        Damaged => "Damaged",
        Other => "Other",
    }
}

/// Option lists used by crab forms and the crab index filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrabEnumOptions {
    pub species: Vec<EnumOption>,
    pub age_unit: Vec<EnumOption>,
    pub gender: Vec<EnumOption>,
    pub health_status: Vec<EnumOption>,
    pub removal_reason: Vec<EnumOption>,
}

impl CrabEnumOptions {
    pub fn build() -> Self {
        Self {
            species: Species::options(),
            age_unit: AgeUnit::options(),
            gender: Gender::options(),
            health_status: HealthStatus::options(),
            removal_reason: CrabRemovalReason::options(),
        }
    }
}

/// Option lists used by pond forms and the pond index filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PondEnumOptions {
    pub location: Vec<EnumOption>,
    pub water_type: Vec<EnumOption>,
    pub removal_reason: Vec<EnumOption>,
}

impl PondEnumOptions {
    pub fn build() -> Self {
        Self {
            location: PondLocation::options(),
            water_type: WaterType::options(),
            removal_reason: PondRemovalReason::options(),
        }
    }
}
