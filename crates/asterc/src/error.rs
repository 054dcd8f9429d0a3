//! Driver error types.
//!
//! These are programmer or environment errors (unreadable files, broken
//! configuration), not user diagnostics: they abort the run with exit
//! code 2 instead of being collected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown lexicon `{0}`")]
    UnknownLexicon(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] aster_common::config::ConfigError),

    #[error("{0}")]
    Ir(#[from] aster_ir::IrError),
}

pub type Result<T> = std::result::Result<T, DriverError>;
