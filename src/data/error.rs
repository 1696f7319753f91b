use std::path::PathBuf;

use thiserror::Error;

/// Failures that make a delivery table unusable.  Everything else (bad numeric
/// cells, empty filter results) degrades to null / empty values instead.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unsupported file extension '.{extension}' for {}", .path.display())]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("required column '{0}' is missing from the table header")]
    MissingColumn(&'static str),

    #[error("malformed document: {0}")]
    Malformed(String),
}
