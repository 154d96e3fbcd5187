// src/aggregate/mention.rs
//! # Mention Aggregator
//! Shared enrichment for key phrases and entities: joins each item's
//! mention-ID list against the batch's response list and computes the
//! item summary (total mentions, sentiment distribution for phrases,
//! segment distribution for both).
//!
//! Tolerance rules: a null mention list normalizes to empty, dangling IDs
//! count toward `total_mentions` but contribute nothing to distributions,
//! and items with blank text or a missing type pass through unmodified.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{bump_segments, SegmentDistribution};
use crate::types::{ExtractedResponse, ExtractionBatch, MentionItem, SentimentLabel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl SentimentDistribution {
    fn bump(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }
}

/// Always recomputed; whatever summary a provider attached was already
/// dropped at the deserialization boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionSummary {
    /// Count of raw mention entries, before ID resolution. A dangling or
    /// duplicate ID still counts here.
    pub total_mentions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_distribution: Option<SentimentDistribution>,
    pub segment_distribution: SegmentDistribution,
}

/// A mentionable item with its freshly computed summary. `mentions` echoes
/// the raw ID list as received, unresolved IDs included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedItem {
    pub text: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub mentions: Vec<String>,
    pub summary: MentionSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseReport {
    pub phrases: Vec<EnrichedItem>,
    pub responses: Vec<ExtractedResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReport {
    pub entities: Vec<EnrichedItem>,
    pub responses: Vec<ExtractedResponse>,
}

/// Enrich the batch's phrase list. Phrases carry a sentiment distribution.
pub fn enrich_phrases(batch: ExtractionBatch) -> PhraseReport {
    let ExtractionBatch {
        responses, phrases, ..
    } = batch;
    let phrases = enrich_items(phrases, &responses, true);
    PhraseReport { phrases, responses }
}

/// Enrich the batch's entity list. Entities carry no sentiment field.
pub fn enrich_entities(batch: ExtractionBatch) -> EntityReport {
    let ExtractionBatch {
        responses, entities, ..
    } = batch;
    let entities = enrich_items(entities, &responses, false);
    EntityReport {
        entities,
        responses,
    }
}

fn enrich_items(
    items: Vec<MentionItem>,
    responses: &[ExtractedResponse],
    with_sentiment: bool,
) -> Vec<EnrichedItem> {
    // ID lookup over the response list; a later duplicate ID wins.
    let mut by_id: HashMap<&str, &ExtractedResponse> = HashMap::with_capacity(responses.len());
    for response in responses {
        by_id.insert(response.id.as_str(), response);
    }

    items
        .into_iter()
        .map(|item| {
            let mentions = item.mentions.unwrap_or_default();
            let total_mentions = mentions.len();
            let mut sentiment_distribution =
                with_sentiment.then(SentimentDistribution::default);
            let mut segment_distribution = SegmentDistribution::new();

            // Distributions are driven by raw mention entries: a duplicate
            // ID increments per occurrence, a dangling ID is skipped.
            for id in &mentions {
                let Some(response) = by_id.get(id.as_str()) else {
                    continue;
                };
                if let Some(dist) = sentiment_distribution.as_mut() {
                    dist.bump(response.sentiment.unwrap_or(SentimentLabel::Neutral));
                }
                bump_segments(&mut segment_distribution, &response.segment);
            }

            EnrichedItem {
                text: item.text,
                kind: item.kind,
                mentions,
                summary: MentionSummary {
                    total_mentions,
                    sentiment_distribution,
                    segment_distribution,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch(value: serde_json::Value) -> ExtractionBatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn dangling_ids_count_toward_total_only() {
        let report = enrich_phrases(batch(json!({
            "responses": [
                { "id": "r_1", "sentence": "fast checkout", "sentiment": "positive",
                  "segment": { "age": "18-25" } }
            ],
            "phrases": [
                { "text": "checkout", "mentions": ["r_1", "r_nonexistent"] }
            ]
        })));

        let item = &report.phrases[0];
        assert_eq!(item.summary.total_mentions, 2);
        assert_eq!(item.mentions, vec!["r_1", "r_nonexistent"]);
        let dist = item.summary.sentiment_distribution.unwrap();
        assert_eq!(dist.positive, 1);
        assert_eq!(dist.neutral + dist.negative, 0);
        assert_eq!(item.summary.segment_distribution["age"]["18-25"], 1);
    }

    #[test]
    fn null_mentions_normalize_to_empty() {
        let report = enrich_phrases(batch(json!({
            "responses": [],
            "phrases": [{ "text": "pricing", "mentions": null }]
        })));
        let item = &report.phrases[0];
        assert!(item.mentions.is_empty());
        assert_eq!(item.summary.total_mentions, 0);
    }

    #[test]
    fn missing_responses_key_is_not_an_error() {
        let report = enrich_phrases(batch(json!({
            "phrases": [{ "text": "support", "mentions": ["r_1"] }]
        })));
        assert!(report.responses.is_empty());
        let item = &report.phrases[0];
        assert_eq!(item.summary.total_mentions, 1);
        assert!(item.summary.segment_distribution.is_empty());
        assert_eq!(
            item.summary.sentiment_distribution.unwrap(),
            SentimentDistribution::default()
        );
    }

    #[test]
    fn duplicate_mention_ids_multiply_count() {
        let report = enrich_entities(batch(json!({
            "responses": [
                { "id": "r_1", "sentence": "acme rocks", "segment": { "region": "West" } }
            ],
            "entities": [
                { "text": "acme", "type": "ORGANIZATION", "mentions": ["r_1", "r_1"] }
            ]
        })));
        let item = &report.entities[0];
        assert_eq!(item.summary.total_mentions, 2);
        // One increment per raw mention entry, not per distinct response.
        assert_eq!(item.summary.segment_distribution["region"]["West"], 2);
        assert!(item.summary.sentiment_distribution.is_none());
    }

    #[test]
    fn later_duplicate_response_id_wins() {
        let report = enrich_phrases(batch(json!({
            "responses": [
                { "id": "r_1", "sentence": "old", "sentiment": "negative" },
                { "id": "r_1", "sentence": "new", "sentiment": "positive" }
            ],
            "phrases": [{ "text": "dup", "mentions": ["r_1"] }]
        })));
        let dist = report.phrases[0].summary.sentiment_distribution.unwrap();
        assert_eq!(dist.positive, 1);
        assert_eq!(dist.negative, 0);
    }

    #[test]
    fn missing_response_sentiment_defaults_neutral() {
        let report = enrich_phrases(batch(json!({
            "responses": [{ "id": "r_1", "sentence": "okay" }],
            "phrases": [{ "text": "okay", "mentions": ["r_1"] }]
        })));
        let dist = report.phrases[0].summary.sentiment_distribution.unwrap();
        assert_eq!(dist.neutral, 1);
    }

    #[test]
    fn blank_items_pass_through() {
        let report = enrich_entities(batch(json!({
            "responses": [],
            "entities": [{ "text": "", "mentions": [] }, {}]
        })));
        assert_eq!(report.entities.len(), 2);
        assert_eq!(report.entities[0].text, "");
        assert_eq!(report.entities[1].kind, None);
        assert_eq!(report.entities[1].summary.total_mentions, 0);
    }
}
