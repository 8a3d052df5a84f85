//! Error types for aciss operations.

use thiserror::Error;

/// Errors that can occur while reading, transforming or validating chapter pages.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Invalid chapter: {0}")]
    InvalidChapter(String),

    #[error("Unknown strategy: {0} (expected \"rebuild\" or \"restructure\")")]
    UnknownStrategy(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),
}

pub type Result<T> = std::result::Result<T, Error>;
