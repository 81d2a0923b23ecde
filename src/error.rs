//! Error types for csdoc.
//!
//! Only conditions that stop an operation live here. Problems inside a
//! source file are [`ParseWarning`](crate::model::ParseWarning)s instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported file type: {path}")]
    UnsupportedFile { path: PathBuf },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("unknown format: {0}. Use table, json, markdown, or template")]
    UnknownFormat(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("failed to serialize json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
