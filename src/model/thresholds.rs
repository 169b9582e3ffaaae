use serde::{Deserialize, Serialize};

use crate::model::flags::QcFlag;

/// Cutoffs shared by the reliability filter and the QC engine.
///
/// CV thresholds are percentages, z-score thresholds are in standard-deviation
/// units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub bead_cutoff: u32,
    pub cv_warning: f64,
    pub cv_error: f64,
    pub zsc_warning: f64,
    pub zsc_error: f64,
}

impl Thresholds {
    pub fn default_v1() -> Self {
        Self {
            bead_cutoff: 25,
            cv_warning: 10.0,
            cv_error: 25.0,
            zsc_warning: 1.5,
            zsc_error: 2.0,
        }
    }

    /// Inclusive bounds: a CV equal to a threshold takes that threshold's flag.
    pub fn classify_cv(&self, cv: f64) -> QcFlag {
        if cv >= self.cv_error {
            QcFlag::Error
        } else if cv >= self.cv_warning {
            QcFlag::Warning
        } else {
            QcFlag::Ok
        }
    }

    /// Exclusive bounds: a z-score equal to a threshold stays below it.
    pub fn classify_zscore(&self, zscore: f64) -> QcFlag {
        if zscore > self.zsc_error {
            QcFlag::Error
        } else if zscore > self.zsc_warning {
            QcFlag::Warning
        } else {
            QcFlag::Ok
        }
    }

    pub fn count_below_cutoff(&self, count: f64) -> bool {
        count < self.bead_cutoff as f64
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::default_v1()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/thresholds.rs"]
mod tests;
