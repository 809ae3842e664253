use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API returned {status}: {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0} returned an empty response")]
    EmptyResponse(String),

    #[error("API key not set: {0}")]
    MissingApiKey(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a model response was rejected wholesale.
#[derive(Error, Debug)]
pub enum DecisionParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing field: {0}")]
    MissingField(&'static str),
}
