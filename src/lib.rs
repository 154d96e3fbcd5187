// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod insight;
pub mod metrics;
pub mod provider;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::mention::{enrich_entities, enrich_phrases, EntityReport, PhraseReport};
pub use crate::aggregate::sentiment::{SentimentAggregator, SentimentReport};
pub use crate::aggregate::SummaryStats;
pub use crate::api::{create_router, AppState};
pub use crate::config::InsightConfig;
pub use crate::error::InsightError;
pub use crate::insight::{EntityInsight, KeyPhraseInsight, SentimentInsight};
pub use crate::types::{
    Entry, ExtractOptions, ExtractionBatch, SentimentLabel, SentimentResult,
};
