//! Error types for voltage-script
//!
//! Compiling and evaluating a script never fails. These errors only cover the
//! edges around the core: configuration files and JSON fragments.

use thiserror::Error;

/// Script configuration errors
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScriptError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ScriptError>;
