// src/config.rs
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{ClientError, Result};
use crate::form::{FormState, Mode};
use crate::models::{Interval, OntologySelection, OutputType, Variant};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the prediction API.
    pub api_base: String,
    /// Directory holding the credential and theme preference files.
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_base =
            std::env::var("GENOVIEW_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let data_dir = match std::env::var("GENOVIEW_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::config_dir()
                .map(|d| d.join("genoview"))
                .ok_or_else(|| {
                    ClientError::Config(
                        "could not determine a data directory; set GENOVIEW_DATA_DIR".to_string(),
                    )
                })?,
        };

        Ok(AppConfig { api_base, data_dir })
    }
}

/// One prediction request described in a TOML preset file, e.g.:
///
/// ```toml
/// mode = "score"
/// output_types = ["RNA_SEQ", "DNASE"]
///
/// [variant]
/// chromosome = "chr22"
/// position = 36201698
/// ref = "A"
/// alt = "C"
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct RequestPreset {
    pub mode: String,

    #[serde(default)]
    pub interval: Option<PresetInterval>,

    #[serde(default)]
    pub variant: Option<PresetVariant>,

    pub output_types: Vec<String>,

    #[serde(default)]
    pub ontology_terms: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PresetInterval {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PresetVariant {
    pub chromosome: String,
    pub position: u64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    #[serde(rename = "alt")]
    pub alt_allele: String,
}

impl RequestPreset {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Lowers the preset into validated form state; the unset coordinate
    /// kind keeps the seeded default so mode switches stay possible.
    pub fn into_form(self) -> Result<FormState> {
        let mode: Mode = self.mode.parse()?;
        let mut form = FormState::default();
        form.mode = mode;

        if let Some(i) = &self.interval {
            form.interval = Interval::new(i.chromosome.parse()?, i.start, i.end);
        }
        if let Some(v) = &self.variant {
            form.variant = Variant::new(
                v.chromosome.parse()?,
                v.position,
                &v.ref_allele,
                &v.alt_allele,
            );
        }

        match mode {
            Mode::Predict if self.interval.is_none() => {
                return Err(ClientError::InvalidInput(
                    "preset mode 'predict' requires an [interval] table".to_string(),
                ));
            }
            Mode::Variant | Mode::Score if self.variant.is_none() => {
                return Err(ClientError::InvalidInput(format!(
                    "preset mode '{}' requires a [variant] table",
                    mode
                )));
            }
            _ => {}
        }

        form.output_types = parse_output_types(&self.output_types)?;
        form.ontology = OntologySelection::from_codes(&self.ontology_terms)?;
        Ok(form)
    }
}

/// Parses and de-duplicates output type names, preserving order.
pub fn parse_output_types(names: &[String]) -> Result<Vec<OutputType>> {
    let mut types = Vec::new();
    for name in names {
        let parsed: OutputType = name.parse()?;
        if !types.contains(&parsed) {
            types.push(parsed);
        }
    }
    Ok(types)
}
