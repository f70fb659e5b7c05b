pub mod secret;
pub mod client;
pub mod prompt;
pub mod response;
pub mod estimator;

pub use secret::Secret;
pub use client::{AiSettings, AnthropicClient, CompletionClient, CompletionRequest};
pub use estimator::{AiOutcome, EstimateSource, Estimator};
pub use response::{extract_json_object, parse_estimate};

use thiserror::Error;

/// Why an AI-assisted estimate could not be used
#[derive(Debug, Error)]
pub enum AiError {
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model service error: {0}")]
    Service(String),
    #[error("model returned no text content")]
    EmptyResponse,
    #[error("no JSON object found in model response")]
    NoJsonObject,
    #[error("malformed JSON in model response: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("estimate failed validation: {0}")]
    InvalidEstimate(String),
}
