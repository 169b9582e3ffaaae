use std::path::PathBuf;

use thiserror::Error;

use crate::model::table::{NA_TEXT, TableValue};

pub mod json;
pub mod text;
pub mod tsv;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whole numbers print without a fraction, everything else with six decimals.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.6}", v)
    }
}

pub fn render_value(value: &TableValue) -> String {
    match value {
        TableValue::Empty => String::new(),
        TableValue::Number(v) => format_number(*v),
        TableValue::Text(s) => s.clone(),
        TableValue::Na => NA_TEXT.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
