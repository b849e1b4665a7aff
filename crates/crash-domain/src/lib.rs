//! # Crash Analytics - Domain Vocabulary
//!
//! Dataset kinds, column names, categorical values and analysis identifiers
//! for the vehicle crash datasets. These names are the single source of truth
//! shared by ingestion, the analytics engine and the command line runner.
//!
//! Every dataset is keyed by [`columns::CRASH_ID`]. There is no materialized
//! crash entity: a crash exists only as the value shared by the rows of the
//! six datasets.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// DATASETS
// =============================================================================

/// The six input datasets owned by one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatasetKind {
    #[serde(rename = "Charges")]
    Charges,
    #[serde(rename = "Damages")]
    Damages,
    #[serde(rename = "Endorse")]
    Endorse,
    #[serde(rename = "Primary_Person")]
    PrimaryPerson,
    #[serde(rename = "Units")]
    Units,
    #[serde(rename = "Restrict")]
    Restrict,
}

impl DatasetKind {
    /// All dataset kinds, in load order.
    pub const ALL: [Self; 6] = [
        Self::Charges,
        Self::Damages,
        Self::Endorse,
        Self::PrimaryPerson,
        Self::Units,
        Self::Restrict,
    ];

    /// Name used in configuration files and as the dataset name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charges => "Charges",
            Self::Damages => "Damages",
            Self::Endorse => "Endorse",
            Self::PrimaryPerson => "Primary_Person",
            Self::Units => "Units",
            Self::Restrict => "Restrict",
        }
    }

    /// Columns the analyses read from this dataset. Ingestion rejects a file
    /// that lacks any of them.
    pub fn required_columns(&self) -> &'static [&'static str] {
        use columns::{charge, damage, person, unit, CRASH_ID};

        match self {
            Self::Charges => &[CRASH_ID, charge::CHARGE],
            Self::Damages => &[CRASH_ID, damage::DAMAGED_PROPERTY],
            Self::Endorse | Self::Restrict => &[CRASH_ID],
            Self::PrimaryPerson => &[
                CRASH_ID,
                person::PRSN_GNDR_ID,
                person::PRSN_INJRY_SEV_ID,
                person::PRSN_ETHNICITY_ID,
                person::DRVR_LIC_STATE_ID,
                person::DRVR_LIC_TYPE_ID,
                person::DRVR_ZIP,
            ],
            Self::Units => &[
                CRASH_ID,
                unit::VEH_BODY_STYL_ID,
                unit::VEH_MAKE_ID,
                unit::VEH_COLOR_ID,
                unit::VEH_LIC_STATE_ID,
                unit::VEH_DMAG_SCL_1_ID,
                unit::VEH_DMAG_SCL_2_ID,
                unit::FIN_RESP_TYPE_ID,
                unit::CONTRIB_FACTR_1_ID,
                unit::CONTRIB_FACTR_2_ID,
                unit::TOT_INJRY_CNT,
                unit::DEATH_CNT,
            ],
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::UnknownDataset(s.to_string()))
    }
}

// =============================================================================
// COLUMNS
// =============================================================================

/// Column names as they appear in the source CSV headers.
pub mod columns {
    /// Join key shared by every dataset.
    pub const CRASH_ID: &str = "CRASH_ID";

    /// Primary person (crash participant) columns.
    pub mod person {
        pub const PRSN_GNDR_ID: &str = "PRSN_GNDR_ID";
        pub const PRSN_INJRY_SEV_ID: &str = "PRSN_INJRY_SEV_ID";
        pub const PRSN_ETHNICITY_ID: &str = "PRSN_ETHNICITY_ID";
        pub const DRVR_LIC_STATE_ID: &str = "DRVR_LIC_STATE_ID";
        pub const DRVR_LIC_TYPE_ID: &str = "DRVR_LIC_TYPE_ID";
        pub const DRVR_ZIP: &str = "DRVR_ZIP";
    }

    /// Unit (vehicle) columns.
    pub mod unit {
        pub const VEH_BODY_STYL_ID: &str = "VEH_BODY_STYL_ID";
        pub const VEH_MAKE_ID: &str = "VEH_MAKE_ID";
        pub const VEH_COLOR_ID: &str = "VEH_COLOR_ID";
        pub const VEH_LIC_STATE_ID: &str = "VEH_LIC_STATE_ID";
        pub const VEH_DMAG_SCL_1_ID: &str = "VEH_DMAG_SCL_1_ID";
        pub const VEH_DMAG_SCL_2_ID: &str = "VEH_DMAG_SCL_2_ID";
        pub const FIN_RESP_TYPE_ID: &str = "FIN_RESP_TYPE_ID";
        pub const CONTRIB_FACTR_1_ID: &str = "CONTRIB_FACTR_1_ID";
        pub const CONTRIB_FACTR_2_ID: &str = "CONTRIB_FACTR_2_ID";
        pub const TOT_INJRY_CNT: &str = "TOT_INJRY_CNT";
        pub const DEATH_CNT: &str = "DEATH_CNT";
    }

    /// Damage observation columns.
    pub mod damage {
        pub const DAMAGED_PROPERTY: &str = "DAMAGED_PROPERTY";
    }

    /// Charge columns.
    pub mod charge {
        pub const CHARGE: &str = "CHARGE";
    }
}

// =============================================================================
// CATEGORICAL VALUES
// =============================================================================

/// Reserved strings meaning "value not recorded".
pub mod sentinel {
    pub const NA: &str = "NA";
    pub const UNKNOWN: &str = "UNKNOWN";
    pub const NOT_REPORTED: &str = "NOT REPORTED";
    pub const INVALID_VALUE: &str = "INVALID VALUE";
    pub const NO_DAMAGE: &str = "NO DAMAGE";
    pub const OTHER_EXPLAIN: &str = "OTHER (EXPLAIN IN NARRATIVE)";
    /// Spelling with two spaces, as exported by the state crash records system.
    pub const OTHER_EXPLAIN_WIDE: &str = "OTHER  (EXPLAIN IN NARRATIVE)";

    /// Body styles that do not identify a vehicle type.
    pub const BODY_STYLE_UNKNOWNS: &[&str] =
        &[NA, UNKNOWN, NOT_REPORTED, OTHER_EXPLAIN, OTHER_EXPLAIN_WIDE];

    /// Ethnicities that do not identify a group.
    pub const ETHNICITY_UNKNOWNS: &[&str] = &[NA, UNKNOWN];

    /// Damage scale values excluded before comparing against a damage level.
    pub const DAMAGE_SCALE_UNKNOWNS: &[&str] = &[NA, NO_DAMAGE, INVALID_VALUE];

    const ALL: &[&str] = &[
        NA,
        UNKNOWN,
        NOT_REPORTED,
        INVALID_VALUE,
        OTHER_EXPLAIN,
        OTHER_EXPLAIN_WIDE,
    ];

    /// Whether `value` is one of the generic "not recorded" markers.
    #[must_use]
    pub fn is_sentinel(value: &str) -> bool {
        ALL.contains(&value)
    }
}

/// Category values the analyses select on.
pub mod category {
    pub const MALE: &str = "MALE";
    pub const FEMALE: &str = "FEMALE";
    pub const KILLED: &str = "KILLED";
    pub const MOTORCYCLE: &str = "MOTORCYCLE";
    pub const ALCOHOL: &str = "ALCOHOL";
    pub const SPEED: &str = "SPEED";
    pub const NONE: &str = "NONE";
    pub const DAMAGED_4: &str = "DAMAGED 4";
    pub const PROOF_OF_LIABILITY_INSURANCE: &str = "PROOF OF LIABILITY INSURANCE";
    pub const DRIVER_LICENSE: &str = "DRIVER LICENSE";
    pub const COMMERCIAL_DRIVER_LIC: &str = "COMMERCIAL DRIVER LIC.";

    /// License types that count as a licensed driver.
    pub const LICENSED_TYPES: &[&str] = &[DRIVER_LICENSE, COMMERCIAL_DRIVER_LIC];
}

// =============================================================================
// ANALYSES
// =============================================================================

/// The eight questions answered by the engine, numbered as in the run output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AnalysisId {
    MaleFatalities,
    TwoWheelers,
    FemaleAccidentState,
    InjuryMakesWindow,
    EthnicityByBodyStyle,
    AlcoholZipCodes,
    UndamagedPropertyCrashes,
    SpeedingMakes,
}

impl AnalysisId {
    /// All analyses, in run order.
    pub const ALL: [Self; 8] = [
        Self::MaleFatalities,
        Self::TwoWheelers,
        Self::FemaleAccidentState,
        Self::InjuryMakesWindow,
        Self::EthnicityByBodyStyle,
        Self::AlcoholZipCodes,
        Self::UndamagedPropertyCrashes,
        Self::SpeedingMakes,
    ];

    /// 1-based analysis number.
    pub fn number(&self) -> u8 {
        match self {
            Self::MaleFatalities => 1,
            Self::TwoWheelers => 2,
            Self::FemaleAccidentState => 3,
            Self::InjuryMakesWindow => 4,
            Self::EthnicityByBodyStyle => 5,
            Self::AlcoholZipCodes => 6,
            Self::UndamagedPropertyCrashes => 7,
            Self::SpeedingMakes => 8,
        }
    }

    /// Look up an analysis by its number.
    pub fn from_number(number: u8) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|id| id.number() == number)
            .ok_or(DomainError::UnknownAnalysis(number))
    }

    /// The question this analysis answers.
    pub fn question(&self) -> &'static str {
        match self {
            Self::MaleFatalities => "Number of crashes in which the persons killed are male",
            Self::TwoWheelers => "Number of two-wheelers booked for crashes",
            Self::FemaleAccidentState => {
                "State with the highest number of accidents involving females"
            }
            Self::InjuryMakesWindow => {
                "5th to 15th vehicle makes contributing to the most injuries including death"
            }
            Self::EthnicityByBodyStyle => "Top ethnic user group of each vehicle body style",
            Self::AlcoholZipCodes => {
                "Top 5 driver zip codes with the most crashes where alcohol was a factor"
            }
            Self::UndamagedPropertyCrashes => {
                "Crash IDs with no damaged property, vehicle damage above level 4 and insurance"
            }
            Self::SpeedingMakes => {
                "Top 5 vehicle makes with speeding charges, licensed drivers, top 10 colours and top 25 states"
            }
        }
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl From<AnalysisId> for u8 {
    fn from(id: AnalysisId) -> Self {
        id.number()
    }
}

impl TryFrom<u8> for AnalysisId {
    type Error = DomainError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number)
    }
}

impl FromStr for AnalysisId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .trim()
            .parse::<u8>()
            .map_err(|_| DomainError::InvalidAnalysisKey(s.to_string()))?;
        Self::from_number(number)
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Formats the result sink can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    #[default]
    Parquet,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }

    /// File extension for output paths given without one.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            _ => Err(DomainError::UnknownFormat(s.to_string())),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Unknown analysis number: {0}")]
    UnknownAnalysis(u8),

    #[error("Invalid analysis key: '{0}'")]
    InvalidAnalysisKey(String),

    #[error("Unknown output format: '{0}'")]
    UnknownFormat(String),

    #[error("Unknown dataset: '{0}'")]
    UnknownDataset(String),
}
