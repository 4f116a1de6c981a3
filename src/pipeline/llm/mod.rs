pub mod client;
pub mod mock;
pub mod prompt;
pub mod sanitize;
pub mod service;
pub mod types;

pub use client::*;
pub use mock::*;
pub use sanitize::*;
pub use service::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("No API key configured for {0}")]
    MissingCredential(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Provider returned error (status {status}): {body}")]
    ProviderError { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Provider returned no choices")]
    EmptyResponse,

    #[error("Reply is not valid JSON: {0}")]
    Sanitize(#[from] SanitizeError),
}
