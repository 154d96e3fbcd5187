// src/aggregate/sentiment.rs
//! # Sentiment Aggregator
//! Pure, testable logic that joins entries with per-entry provider results
//! and derives global/per-segment summaries plus top extreme comments.
//! No I/O, suitable for unit tests and offline evaluation.
//!
//! The join is positional: `results[i]` annotates `entries[i]`. A result
//! list shorter than the entry list leaves the tail unscored; that is an
//! expected provider condition, not an error.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{SentimentCounts, SummaryStats};
use crate::types::{Entry, SentimentLabel, SentimentResult};

/// One entry annotated with its provider verdict, in original input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedResponse {
    pub answer: String,
    pub segment: BTreeMap<String, String>,
    pub sentiment_label: Option<SentimentLabel>,
    pub sentiment_score: Option<f64>,
}

/// `{answer, score}` pair for the top-comment lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredComment {
    pub answer: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReport {
    pub global_summary: SummaryStats,
    /// Dimension -> value -> independent stats block. Empty when no entry
    /// carries segments.
    pub segment_summary: BTreeMap<String, BTreeMap<String, SummaryStats>>,
    pub top_positive_comments: Vec<ScoredComment>,
    pub top_negative_comments: Vec<ScoredComment>,
    /// Full annotated list, preserving input order (not limited to top-N).
    pub responses: Vec<AnnotatedResponse>,
}

#[derive(Debug, Clone)]
pub struct SentimentAggregator {
    top_count: usize,
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self { top_count: 5 }
    }
}

impl SentimentAggregator {
    pub fn new(top_count: usize) -> Self {
        Self { top_count }
    }

    pub fn analyze(&self, entries: &[Entry], results: &[SentimentResult]) -> SentimentReport {
        // 1) Positional join; missing results leave the entry unscored.
        let responses: Vec<AnnotatedResponse> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let result = results.get(i).cloned().unwrap_or_default();
                AnnotatedResponse {
                    answer: entry.answer.clone(),
                    segment: entry.segment.clone(),
                    sentiment_label: result.label,
                    sentiment_score: result.score,
                }
            })
            .collect();

        // 2) Global counts. Unscored entries still count toward the total.
        let mut global = SentimentCounts::default();
        for response in &responses {
            global.observe(response.sentiment_label);
        }

        // 3) Independent counts per (dimension, value) group. A response
        // with two dimensions contributes to two groups.
        let mut groups: BTreeMap<String, BTreeMap<String, SentimentCounts>> = BTreeMap::new();
        for response in &responses {
            for (dimension, value) in &response.segment {
                groups
                    .entry(dimension.clone())
                    .or_default()
                    .entry(value.clone())
                    .or_default()
                    .observe(response.sentiment_label);
            }
        }
        let segment_summary = groups
            .into_iter()
            .map(|(dimension, values)| {
                let stats = values
                    .into_iter()
                    .map(|(value, counts)| (value, SummaryStats::from_counts(&counts)))
                    .collect();
                (dimension, stats)
            })
            .collect();

        SentimentReport {
            global_summary: SummaryStats::from_counts(&global),
            segment_summary,
            top_positive_comments: self.top_comments(&responses, SentimentLabel::Positive),
            top_negative_comments: self.top_comments(&responses, SentimentLabel::Negative),
            responses,
        }
    }

    /// Positive comments sort descending by score, negative ascending (most
    /// negative first). Ties keep input order; a missing score sorts as 0.0
    /// without affecting the counted buckets.
    fn top_comments(
        &self,
        responses: &[AnnotatedResponse],
        label: SentimentLabel,
    ) -> Vec<ScoredComment> {
        let mut hits: Vec<&AnnotatedResponse> = responses
            .iter()
            .filter(|r| r.sentiment_label == Some(label))
            .collect();

        // Vec::sort_by is stable, which is what keeps ties in input order.
        hits.sort_by(|a, b| {
            let sa = a.sentiment_score.unwrap_or(0.0);
            let sb = b.sentiment_score.unwrap_or(0.0);
            let ord = match label {
                SentimentLabel::Negative => sa.partial_cmp(&sb),
                _ => sb.partial_cmp(&sa),
            };
            ord.unwrap_or(Ordering::Equal)
        });

        hits.into_iter()
            .take(self.top_count)
            .map(|r| ScoredComment {
                answer: r.answer.clone(),
                score: r.sentiment_score,
            })
            .collect()
    }
}
