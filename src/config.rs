use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::controls::ControlPolicy;
use crate::model::thresholds::Thresholds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Output colors, ARGB hex as spreadsheet renderers expect them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub warning_color: String,
    pub error_color: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            warning_color: "FFFFA500".to_string(),
            error_color: "FFFF0000".to_string(),
        }
    }
}

/// Immutable run configuration threaded through every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub protocol: String,
    pub plate_count: u32,
    pub plate_types: Vec<String>,
    #[serde(flatten)]
    pub thresholds: Thresholds,
    #[serde(flatten)]
    pub palette: Palette,
    pub control_policy: ControlPolicy,
    pub include_perplate_controls: bool,
    pub include_bead_counts: bool,
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            protocol: String::new(),
            plate_count: 1,
            plate_types: vec![String::new()],
            thresholds: Thresholds::default_v1(),
            palette: Palette::default(),
            control_policy: ControlPolicy::default(),
            include_perplate_controls: false,
            include_bead_counts: false,
            verbose: false,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol.trim().is_empty() {
            return Err(ConfigError::Invalid("protocol name is required".to_string()));
        }
        if self.plate_count == 0 {
            return Err(ConfigError::Invalid("plate_count must be >= 1".to_string()));
        }
        if self.plate_types.is_empty() {
            return Err(ConfigError::Invalid(
                "plate_types must list at least one type (use \"\" for none)".to_string(),
            ));
        }
        let t = &self.thresholds;
        if !(t.cv_warning.is_finite() && t.cv_error.is_finite()) || t.cv_warning > t.cv_error {
            return Err(ConfigError::Invalid(format!(
                "cv_warning ({}) must not exceed cv_error ({})",
                t.cv_warning, t.cv_error
            )));
        }
        if !(t.zsc_warning.is_finite() && t.zsc_error.is_finite()) || t.zsc_warning > t.zsc_error
        {
            return Err(ConfigError::Invalid(format!(
                "zsc_warning ({}) must not exceed zsc_error ({})",
                t.zsc_warning, t.zsc_error
            )));
        }
        if let ControlPolicy::ExplicitList { names } = &self.control_policy {
            if names.is_empty() || names.iter().any(|n| n.is_empty()) {
                return Err(ConfigError::Invalid(
                    "explicit control list must contain non-empty names".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn combined_name(&self) -> String {
        format!("{}_results_combined", self.protocol)
    }

    pub fn master_name(&self) -> String {
        format!("{}_results_master", self.protocol)
    }

    pub fn report_name(&self) -> String {
        format!("{}_qc_report.txt", self.protocol)
    }
}

pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;
