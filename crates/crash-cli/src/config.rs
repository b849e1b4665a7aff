//! # Run Configuration
//!
//! Run configuration naming the six input files, one output path per
//! analysis, the output format and the analysis options. Files ending in
//! `.yaml` or `.yml` are read as YAML, everything else as JSON; both use the
//! same keys.
//!
//! ```json
//! {
//!   "INPUT_FILENAME": {"Charges": "Data/Charges_use.csv", "...": "..."},
//!   "OUTPUT_PATH": {"1": "Output/1", "...": "...", "8": "Output/8"},
//!   "FILE_FORMAT": {"Output": "parquet"},
//!   "OPTIONS": {"damage_scale_comparison": "lexicographic", "distinct_crash_ids": false}
//! }
//! ```

use crate::error::ConfigError;
use crash_analytics::{AnalysisOptions, OutputTarget};
use crash_domain::{AnalysisId, DatasetKind, OutputFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Output format block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFormat {
    /// Format name, case-insensitive. Parquet when absent.
    #[serde(rename = "Output", default)]
    pub output: Option<String>,
}

/// Parsed run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Input file per dataset name
    #[serde(rename = "INPUT_FILENAME", default)]
    pub input_filename: BTreeMap<String, PathBuf>,

    /// Output path per analysis number
    #[serde(rename = "OUTPUT_PATH", default)]
    pub output_path: BTreeMap<String, PathBuf>,

    #[serde(rename = "FILE_FORMAT", default)]
    pub file_format: FileFormat,

    #[serde(rename = "OPTIONS", default)]
    pub options: AnalysisOptions,
}

impl RunConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml"));
        if is_yaml {
            Self::from_yaml(&text)
        } else {
            Self::from_json(&text)
        }
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(text)?.validated()
    }

    /// Parse and validate a YAML configuration document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str::<Self>(text)?.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.inputs()?;
        self.targets()?;
        Ok(self)
    }

    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        Ok(self
            .file_format
            .output
            .as_deref()
            .map(str::parse::<OutputFormat>)
            .transpose()?
            .unwrap_or_default())
    }

    /// Input files keyed by dataset. Datasets without an entry are left out.
    pub fn inputs(&self) -> Result<BTreeMap<DatasetKind, PathBuf>, ConfigError> {
        self.input_filename
            .iter()
            .map(|(name, path)| -> Result<_, ConfigError> {
                Ok((name.parse::<DatasetKind>()?, path.clone()))
            })
            .collect()
    }

    /// Output targets keyed by analysis. Analyses without an entry are left
    /// out and fail when run.
    pub fn targets(&self) -> Result<BTreeMap<AnalysisId, OutputTarget>, ConfigError> {
        let format = self.output_format()?;
        self.output_path
            .iter()
            .map(|(key, path)| -> Result<_, ConfigError> {
                Ok((key.parse::<AnalysisId>()?, OutputTarget::new(path.clone(), format)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_analytics::DamageScaleComparison;
    use crash_domain::DomainError;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "INPUT_FILENAME": {
            "Charges": "Data/Charges_use.csv",
            "Damages": "Data/Damages_use.csv",
            "Endorse": "Data/Endorse_use.csv",
            "Primary_Person": "Data/Primary_Person_use.csv",
            "Units": "Data/Units_use.csv",
            "Restrict": "Data/Restrict_use.csv"
        },
        "OUTPUT_PATH": {"1": "Output/1", "4": "Output/4", "8": "Output/8"},
        "FILE_FORMAT": {"Output": "CSV"},
        "OPTIONS": {"distinct_crash_ids": true}
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = RunConfig::from_json(SAMPLE).unwrap();

        let inputs = config.inputs().unwrap();
        assert_eq!(inputs.len(), 6);
        assert_eq!(
            inputs[&DatasetKind::PrimaryPerson],
            PathBuf::from("Data/Primary_Person_use.csv")
        );

        let targets = config.targets().unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(
            targets[&AnalysisId::InjuryMakesWindow],
            OutputTarget::new("Output/4", OutputFormat::Csv)
        );
        assert!(!targets.contains_key(&AnalysisId::TwoWheelers));

        assert!(config.options.distinct_crash_ids);
        assert_eq!(
            config.options.damage_scale_comparison,
            DamageScaleComparison::Lexicographic
        );
    }

    #[test]
    fn test_defaults_to_parquet() {
        let config = RunConfig::from_json(r#"{"OUTPUT_PATH": {"2": "Output/2"}}"#).unwrap();
        assert_eq!(config.output_format().unwrap(), OutputFormat::Parquet);
        assert!(config.inputs().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_keys_and_formats() {
        let err = RunConfig::from_json(r#"{"OUTPUT_PATH": {"9": "Output/9"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Domain(DomainError::UnknownAnalysis(9))));

        let err = RunConfig::from_json(r#"{"INPUT_FILENAME": {"Vehicles": "v.csv"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Domain(DomainError::UnknownDataset(_))));

        let err = RunConfig::from_json(r#"{"FILE_FORMAT": {"Output": "orc"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Domain(DomainError::UnknownFormat(_))));

        let err = RunConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    const SAMPLE_YAML: &str = "\
INPUT_FILENAME:
  Charges: Data/Charges_use.csv
  Units: Data/Units_use.csv
OUTPUT_PATH:
  1: Output/1
  7: Output/7
FILE_FORMAT:
  Output: csv
";

    #[test]
    fn test_parse_yaml_with_numeric_keys() {
        let config = RunConfig::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(config.inputs().unwrap().len(), 2);

        let targets = config.targets().unwrap();
        assert_eq!(
            targets[&AnalysisId::UndamagedPropertyCrashes],
            OutputTarget::new("Output/7", OutputFormat::Csv)
        );
        assert_eq!(config.options, AnalysisOptions::default());

        let err = RunConfig::from_yaml("OUTPUT_PATH: [1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_from_file_picks_format_by_extension() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("config.yaml");
        fs::write(&yaml, SAMPLE_YAML).unwrap();
        assert_eq!(RunConfig::from_file(&yaml).unwrap().targets().unwrap().len(), 2);

        let misnamed = dir.path().join("config.json");
        fs::write(&misnamed, SAMPLE_YAML).unwrap();
        assert!(matches!(
            RunConfig::from_file(&misnamed),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, SAMPLE).unwrap();
        assert_eq!(RunConfig::from_file(&path).unwrap().targets().unwrap().len(), 3);

        let err = RunConfig::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
