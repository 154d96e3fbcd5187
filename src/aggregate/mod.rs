// src/aggregate/mod.rs
//! Aggregation and enrichment engine.
//!
//! Pure, synchronous, stateless: each call is a function of its inputs plus
//! an already-fetched provider result. No I/O, no shared state, safe to run
//! concurrently.

pub mod mention;
pub mod sentiment;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::SentimentLabel;

// Re-export convenient types.
pub use mention::{enrich_entities, enrich_phrases, EnrichedItem, EntityReport, PhraseReport};
pub use sentiment::{SentimentAggregator, SentimentReport};

/// Dimension -> value -> count. BTree keeps serialization order stable so
/// re-aggregating the same input is byte-identical.
pub type SegmentDistribution = BTreeMap<String, BTreeMap<String, u64>>;

/// Count sentiment labels into one of three buckets. Unrecognized or absent
/// labels count toward the total only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentCounts {
    pub total: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    pub fn observe(&mut self, label: Option<SentimentLabel>) {
        self.total += 1;
        match label {
            Some(SentimentLabel::Positive) => self.positive += 1,
            Some(SentimentLabel::Neutral) => self.neutral += 1,
            Some(SentimentLabel::Negative) => self.negative += 1,
            None => {}
        }
    }
}

/// Summary statistics block, global or per segment group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_count: usize,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
    pub positive_percentage: f64,
    pub neutral_percentage: f64,
    pub negative_percentage: f64,
    pub net_sentiment_score: f64,
}

impl SummaryStats {
    /// Zero entries means all percentages and the net score are 0.0.
    pub fn from_counts(counts: &SentimentCounts) -> Self {
        let pct = |count: usize| {
            if counts.total == 0 {
                0.0
            } else {
                100.0 * count as f64 / counts.total as f64
            }
        };
        let positive_percentage = pct(counts.positive);
        let neutral_percentage = pct(counts.neutral);
        let negative_percentage = pct(counts.negative);
        Self {
            total_count: counts.total,
            positive_count: counts.positive,
            neutral_count: counts.neutral,
            negative_count: counts.negative,
            positive_percentage,
            neutral_percentage,
            negative_percentage,
            net_sentiment_score: positive_percentage - negative_percentage,
        }
    }
}

/// Increment the distribution once per `(dimension, value)` pair carried by
/// one contributing response.
pub(crate) fn bump_segments(dist: &mut SegmentDistribution, segment: &BTreeMap<String, String>) {
    for (dimension, value) in segment {
        *dist
            .entry(dimension.clone())
            .or_default()
            .entry(value.clone())
            .or_insert(0) += 1;
    }
}
