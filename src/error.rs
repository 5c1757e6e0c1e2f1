//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use crate::gateway::GenerationKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected by local validation before any provider call.
    #[error("{0}")]
    InvalidInput(String),

    /// Terminal failure of a single generation request. `message` is the
    /// user-facing text for `kind`; the underlying cause is only logged.
    #[error("{message}")]
    Generation {
        kind: GenerationKind,
        message: String,
    },

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Error::Generation { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
