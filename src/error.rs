use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovxmlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML write error: {0}")]
    Xml(quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid ignore filter '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        source: regex::Error,
    },

    #[error("Source file not found in coverage data: {0}")]
    FileNotFound(String),
}

impl From<quick_xml::Error> for CovxmlError {
    /// Sink failures surface as plain I/O errors so callers see the
    /// original `std::io::Error`.
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => match Arc::try_unwrap(io) {
                Ok(io) => CovxmlError::Io(io),
                Err(shared) => CovxmlError::Io(std::io::Error::new(shared.kind(), shared.to_string())),
            },
            other => CovxmlError::Xml(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CovxmlError>;
