//! Error types for catalog loading, properties persistence, and review commands.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load one rule-set file. Recoverable: merges skip the file.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Rule set not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to parse rule set {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Failure to read, decode, encode, or write a persisted properties document.
#[derive(Error, Debug)]
pub enum PropertiesError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Properties document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Malformed properties document: {0}")]
    Malformed(#[from] toml::de::Error),

    #[error("Failed to encode properties: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Failure of the review command surface.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid review input: {0}")]
    Validation(String),

    #[error("Required input not set: {0}")]
    UnsetInput(&'static str),

    #[error("Review was cancelled")]
    Cancelled,

    #[error("Review failed: {0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, PropertiesError>;
