// src/types.rs
//! Core data model shared by providers and aggregators.
//!
//! All tolerance rules for loosely-shaped provider payloads live here, once:
//! missing keys deserialize to empty collections, unrecognized sentiment
//! labels normalize to `None`. Aggregation code downstream never has to
//! re-check these defaults.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One raw input unit: free-form answer text plus optional segment tags
/// (e.g. `age -> "25-34"`). Owned by the caller, read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub answer: String,
    #[serde(default)]
    pub segment: BTreeMap<String, String>,
}

impl Entry {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            segment: BTreeMap::new(),
        }
    }

    pub fn with_segment(mut self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        self.segment.insert(dimension.into(), value.into());
        self
    }
}

/// Closed sentiment label set. Anything a provider emits outside this set
/// is treated as "unscored" rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Case-insensitive parse; unknown strings map to `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

/// Lenient label field: absent, null, or unrecognized all become `None`.
fn label_lenient<'de, D>(de: D) -> Result<Option<SentimentLabel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.as_deref().and_then(SentimentLabel::parse))
}

/// Per-entry sentiment verdict from a provider, joined positionally with
/// the input entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentResult {
    #[serde(default, deserialize_with = "label_lenient")]
    pub label: Option<SentimentLabel>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Provider-normalized view of one processed entry inside an extraction
/// batch. `id` is stable per batch but carries no ordering guarantee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedResponse {
    pub id: String,
    #[serde(alias = "answer")]
    pub sentence: String,
    pub segment: BTreeMap<String, String>,
    #[serde(deserialize_with = "label_lenient")]
    pub sentiment: Option<SentimentLabel>,
}

/// A phrase or entity produced by a provider, referencing responses by ID.
///
/// There is no `summary` field on purpose: any summary a provider attaches
/// is dropped during deserialization and recomputed by the aggregator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionItem {
    pub text: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub mentions: Option<Vec<String>>,
}

/// Raw batch-extraction result. Either list may be absent in the provider
/// payload; both deserialize to empty rather than failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionBatch {
    pub responses: Vec<ExtractedResponse>,
    pub phrases: Vec<MentionItem>,
    pub entities: Vec<MentionItem>,
}

/// What an `extract_batch` call should pull out of the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionTarget {
    Phrases,
    Entities,
}

impl ExtractionTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phrases => "key phrases",
            Self::Entities => "entities",
        }
    }
}

/// Extra prompt hints for LLM-backed extraction. Providers that do not
/// prompt ignore these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractOptions {
    #[serde(default)]
    pub max_items: Option<usize>,
    #[serde(default)]
    pub guidance: Option<String>,
}
