// src/error.rs
//! Error taxonomy for the insight engine.
//!
//! Only two variants can surface at construction time (`UnknownProvider`,
//! `Unsupported`); the rest belong to provider calls. Aggregators never
//! fail: sparse or malformed provider output degrades into empty or
//! zero-valued fields instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsightError {
    /// Caller supplied a provider identifier outside the closed set.
    #[error("unknown provider `{0}` (expected one of: local, openai, claude)")]
    UnknownProvider(String),

    /// The resolved provider structurally cannot perform the requested
    /// operation (e.g. extraction against the local lexicon).
    #[error("provider `{provider}` does not support {capability}")]
    Unsupported {
        provider: &'static str,
        capability: &'static str,
    },

    /// Provider needs an API key that is not present in the environment.
    #[error("missing `{0}` in environment")]
    MissingApiKey(&'static str),

    /// Transport-level failure after the provider's own retries.
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider returned a body the client could not interpret.
    #[error("provider returned malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Bounded retry gave up; carries the final attempt's failure.
    #[error("provider call `{operation}` failed after {attempts} attempts: {source}")]
    Exhausted {
        operation: &'static str,
        attempts: usize,
        #[source]
        source: Box<InsightError>,
    },
}
