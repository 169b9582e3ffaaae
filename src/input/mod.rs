use std::path::PathBuf;

use thiserror::Error;

pub mod grid;
pub mod plate;

pub use plate::load_plates;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("missing input: {0}")]
    MissingInput(String),
}
