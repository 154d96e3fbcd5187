// src/provider/mod.rs
//! Provider clients: the pluggable NLP inference collaborators.
//!
//! A provider identifier out of the closed set resolves once, at
//! construction, into a concrete client behind the two-operation
//! `ProviderClient` trait. The aggregation core never sees provider
//! identity; it only consumes the normalized result shapes.

pub mod claude;
pub mod lexicon;
pub mod llm;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::InsightConfig;
use crate::error::InsightError;
use crate::types::{
    Entry, ExtractOptions, ExtractionBatch, ExtractionTarget, SentimentResult,
};

pub use claude::ClaudeProvider;
pub use lexicon::LexiconProvider;
pub use llm::LlmClient;
pub use openai::OpenAiProvider;

/// Closed provider set. String identifiers from configuration resolve here
/// exactly once; everything downstream dispatches on the concrete client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Local,
    OpenAi,
    Claude,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Result<Self, InsightError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "openai" => Ok(Self::OpenAi),
            "claude" => Ok(Self::Claude),
            other => Err(InsightError::UnknownProvider(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::OpenAi => "openai",
            Self::Claude => "claude",
        }
    }

    /// The local lexicon scores sentiment only; phrase/entity extraction
    /// needs a hosted model.
    pub fn supports_extraction(&self) -> bool {
        !matches!(self, Self::Local)
    }
}

/// Fixed two-operation capability interface all providers satisfy.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// One result per input entry, same order. Callers tolerate a short
    /// list, but providers keep positional alignment wherever they can.
    async fn analyze_entries(
        &self,
        entries: &[Entry],
        question: Option<&str>,
    ) -> Result<Vec<SentimentResult>, InsightError>;

    /// Batch extraction of phrases or entities referencing responses by ID.
    async fn extract_batch(
        &self,
        entries: &[Entry],
        question: Option<&str>,
        target: ExtractionTarget,
        options: &ExtractOptions,
    ) -> Result<ExtractionBatch, InsightError>;

    /// Provider name for diagnostics/metrics.
    fn name(&self) -> &'static str;
}

/// Convenient alias used by the façade and handlers.
pub type DynProviderClient = Arc<dyn ProviderClient>;

/// Build the concrete client for an already-resolved kind. Capability
/// checks happen in the façade constructors, before this is called.
pub fn build_client(kind: ProviderKind, config: &InsightConfig) -> DynProviderClient {
    match kind {
        ProviderKind::Local => Arc::new(LexiconProvider::new()),
        ProviderKind::OpenAi => Arc::new(LlmClient::new(OpenAiProvider::from_env(
            config.openai_model.as_deref(),
        ))),
        ProviderKind::Claude => Arc::new(LlmClient::new(ClaudeProvider::from_env(
            config.claude_model.as_deref(),
        ))),
    }
}

const MAX_ATTEMPTS: usize = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Bounded retry with exponential backoff for hosted provider calls.
/// Covers transport failures and malformed model payloads alike; a result
/// that survives this is the final word as far as the core is concerned.
pub(crate) async fn with_backoff<T, F, Fut>(
    operation: &'static str,
    mut call: F,
) -> Result<T, InsightError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, InsightError>>,
{
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 0;

    loop {
        attempt += 1;
        counter!("insight_provider_calls_total", "operation" => operation).increment(1);
        match call().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation, attempts = attempt, "provider call succeeded after retry");
                }
                return Ok(value);
            }
            // Missing credentials never heal on retry.
            Err(err @ InsightError::MissingApiKey(_)) => return Err(err),
            Err(err) if attempt >= MAX_ATTEMPTS => {
                counter!("insight_provider_errors_total", "operation" => operation).increment(1);
                warn!(operation, attempts = attempt, error = %err, "provider call gave up");
                return Err(InsightError::Exhausted {
                    operation,
                    attempts: attempt,
                    source: Box::new(err),
                });
            }
            Err(err) => {
                warn!(
                    operation,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "provider call failed, retrying"
                );
                sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_is_case_insensitive() {
        assert_eq!(ProviderKind::parse("OpenAI").unwrap(), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::parse(" local ").unwrap(), ProviderKind::Local);
        assert_eq!(ProviderKind::parse("claude").unwrap(), ProviderKind::Claude);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = ProviderKind::parse("aws").unwrap_err();
        assert!(matches!(err, InsightError::UnknownProvider(ref s) if s == "aws"));
    }

    #[test]
    fn only_local_lacks_extraction() {
        assert!(!ProviderKind::Local.supports_extraction());
        assert!(ProviderKind::OpenAi.supports_extraction());
        assert!(ProviderKind::Claude.supports_extraction());
    }
}
