//! Error types for driftdoc operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriftError>;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Schema mismatch: {message}")]
    SchemaMismatch { message: String },

    #[error("Print layout error: {message}")]
    Layout { message: String },

    #[error("Row rejected by table '{table}': {reason}")]
    RowRejected { table: String, reason: String },

    #[error("Invalid section definition: {path}: {message}")]
    InvalidSection { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl DriftError {
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: msg.into(),
        }
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout {
            message: msg.into(),
        }
    }

    pub fn row_rejected(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RowRejected {
            table: table.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_section(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::InvalidSection {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}
