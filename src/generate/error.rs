//! Errors raised while talking to the model or running Robot Framework.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("GROQ_API_KEY must be set to call the language model")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error: {0}")]
    Api(String),

    #[error("Model reply had no message content")]
    EmptyResponse,

    #[error("Failed writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Robot command is empty")]
    EmptyCommand,

    #[error("Failed to run `{command}`: {source}")]
    Robot {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
