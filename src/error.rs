//! Error taxonomy for per-file analysis
//!
//! Every variant is caught at the per-file boundary in [`crate::batch`] and
//! turned into a console line; none of them aborts the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or analyzing one session table
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Read error: {0}")]
    Parse(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Column '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("Table has no data rows")]
    EmptyTable,

    #[error("IO error on {artifact}: {source}")]
    Io {
        artifact: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render {artifact}: {message}")]
    Render { artifact: String, message: String },

    #[error("Failed to assemble document: {0}")]
    Document(String),

    #[error(
        "Output directory {} already holds the report of {}",
        .dir.display(),
        .owner.display()
    )]
    OutputClash { dir: PathBuf, owner: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        AnalysisError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
