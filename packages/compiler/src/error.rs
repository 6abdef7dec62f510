//! Compiler errors
//!
//! Parsing and optimization only ever produce warnings; these are the
//! failures of the configuration layer and the orchestrator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid delimiters {open:?} / {close:?}: both delimiters must be non-empty")]
    InvalidDelimiters { open: String, close: String },

    #[error("invalid compiler options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompileError>;
