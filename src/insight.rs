// src/insight.rs
//! Insight façades: resolve a provider once at construction, call it, run
//! the matching aggregator over the result.
//!
//! Capability problems (unknown identifier, extraction against the local
//! lexicon) surface here, at construction, never later mid-call.

use crate::aggregate::mention::{enrich_entities, enrich_phrases, EntityReport, PhraseReport};
use crate::aggregate::sentiment::{SentimentAggregator, SentimentReport};
use crate::config::InsightConfig;
use crate::error::InsightError;
use crate::provider::{build_client, DynProviderClient};
use crate::types::{Entry, ExtractOptions, ExtractionTarget};

/// Sentiment distribution over a batch of entries. Falls back to the local
/// lexicon when no provider is configured.
pub struct SentimentInsight {
    client: DynProviderClient,
    aggregator: SentimentAggregator,
}

impl SentimentInsight {
    pub fn new(config: &InsightConfig) -> Result<Self, InsightError> {
        let kind = config.provider_kind()?;
        Ok(Self {
            client: build_client(kind, config),
            aggregator: SentimentAggregator::new(config.top_count),
        })
    }

    /// Mostly a test seam: run the same aggregation over any client.
    pub fn with_client(client: DynProviderClient, top_count: usize) -> Self {
        Self {
            client,
            aggregator: SentimentAggregator::new(top_count),
        }
    }

    pub async fn analyze(
        &self,
        entries: &[Entry],
        question: Option<&str>,
    ) -> Result<SentimentReport, InsightError> {
        let results = self.client.analyze_entries(entries, question).await?;
        Ok(self.aggregator.analyze(entries, &results))
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.name()
    }
}

/// Key-phrase mention statistics. No local fallback: construction fails
/// with an unsupported-capability error against the local provider.
pub struct KeyPhraseInsight {
    client: DynProviderClient,
}

impl KeyPhraseInsight {
    pub fn new(config: &InsightConfig) -> Result<Self, InsightError> {
        Ok(Self {
            client: extraction_client(config, "key-phrase extraction")?,
        })
    }

    pub fn with_client(client: DynProviderClient) -> Self {
        Self { client }
    }

    pub async fn extract(
        &self,
        entries: &[Entry],
        question: Option<&str>,
    ) -> Result<PhraseReport, InsightError> {
        self.extract_with_options(entries, question, &ExtractOptions::default())
            .await
    }

    pub async fn extract_with_options(
        &self,
        entries: &[Entry],
        question: Option<&str>,
        options: &ExtractOptions,
    ) -> Result<PhraseReport, InsightError> {
        let batch = self
            .client
            .extract_batch(entries, question, ExtractionTarget::Phrases, options)
            .await?;
        Ok(enrich_phrases(batch))
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.name()
    }
}

/// Named-entity mention statistics. Same capability rule as key phrases.
pub struct EntityInsight {
    client: DynProviderClient,
}

impl EntityInsight {
    pub fn new(config: &InsightConfig) -> Result<Self, InsightError> {
        Ok(Self {
            client: extraction_client(config, "entity extraction")?,
        })
    }

    pub fn with_client(client: DynProviderClient) -> Self {
        Self { client }
    }

    pub async fn extract(
        &self,
        entries: &[Entry],
        question: Option<&str>,
    ) -> Result<EntityReport, InsightError> {
        self.extract_with_options(entries, question, &ExtractOptions::default())
            .await
    }

    pub async fn extract_with_options(
        &self,
        entries: &[Entry],
        question: Option<&str>,
        options: &ExtractOptions,
    ) -> Result<EntityReport, InsightError> {
        let batch = self
            .client
            .extract_batch(entries, question, ExtractionTarget::Entities, options)
            .await?;
        Ok(enrich_entities(batch))
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.name()
    }
}

fn extraction_client(
    config: &InsightConfig,
    capability: &'static str,
) -> Result<DynProviderClient, InsightError> {
    let kind = config.provider_kind()?;
    if !kind.supports_extraction() {
        return Err(InsightError::Unsupported {
            provider: kind.as_str(),
            capability,
        });
    }
    Ok(build_client(kind, config))
}
