// tests/mention_aggregate.rs
//
// Mention-enrichment properties: raw-count semantics, dangling and
// duplicate IDs, missing keys, and the shared-segment scenario.

use serde_json::json;
use survey_insights::types::ExtractionBatch;
use survey_insights::{enrich_entities, enrich_phrases};

fn batch(value: serde_json::Value) -> ExtractionBatch {
    serde_json::from_value(value).expect("batch json")
}

#[test]
fn total_mentions_counts_raw_entries_not_resolved_ones() {
    let report = enrich_phrases(batch(json!({
        "responses": [
            { "id": "r_1", "sentence": "quick setup", "sentiment": "positive",
              "segment": { "plan": "pro" } }
        ],
        "phrases": [
            { "text": "setup", "mentions": ["r_1", "r_nonexistent"] }
        ]
    })));

    let item = &report.phrases[0];
    assert_eq!(item.summary.total_mentions, 2);
    // Raw list is echoed unchanged, dangling ID included.
    assert_eq!(item.mentions, vec!["r_1", "r_nonexistent"]);
    // Distributions reflect only the resolved response.
    let dist = item.summary.sentiment_distribution.unwrap();
    assert_eq!((dist.positive, dist.neutral, dist.negative), (1, 0, 0));
    assert_eq!(item.summary.segment_distribution["plan"]["pro"], 1);
}

#[test]
fn null_mentions_become_empty_list() {
    let report = enrich_phrases(batch(json!({
        "responses": [],
        "phrases": [{ "text": "pricing", "mentions": null }]
    })));
    let item = &report.phrases[0];
    assert!(item.mentions.is_empty());
    assert_eq!(item.summary.total_mentions, 0);
}

#[test]
fn missing_responses_key_yields_empty_distributions() {
    let report = enrich_entities(batch(json!({
        "entities": [
            { "text": "acme", "type": "ORGANIZATION", "mentions": ["r_1", "r_2"] }
        ]
    })));
    assert!(report.responses.is_empty());
    let item = &report.entities[0];
    assert_eq!(item.summary.total_mentions, 2);
    assert!(item.summary.segment_distribution.is_empty());
    assert!(item.summary.sentiment_distribution.is_none());
}

#[test]
fn shared_response_counts_in_both_items_independently() {
    // One entry with two segment dimensions, mentioned by two phrases:
    // both phrase summaries show the same independent segment counts.
    let report = enrich_phrases(batch(json!({
        "responses": [
            { "id": "r_1", "sentence": "fast and cheap",
              "segment": { "age": "18-25", "region": "West" } }
        ],
        "phrases": [
            { "text": "fast", "mentions": ["r_1"] },
            { "text": "cheap", "mentions": ["r_1"] }
        ]
    })));

    for item in &report.phrases {
        assert_eq!(item.summary.segment_distribution["age"]["18-25"], 1);
        assert_eq!(item.summary.segment_distribution["region"]["West"], 1);
    }
}

#[test]
fn duplicate_mention_of_one_response_multiply_counts() {
    let report = enrich_entities(batch(json!({
        "responses": [
            { "id": "r_1", "sentence": "acme twice", "segment": { "region": "West" } }
        ],
        "entities": [
            { "text": "acme", "type": "ORGANIZATION", "mentions": ["r_1", "r_1"] }
        ]
    })));
    let item = &report.entities[0];
    assert_eq!(item.summary.total_mentions, 2);
    // Distribution multiplicity follows raw mention entries.
    assert_eq!(item.summary.segment_distribution["region"]["West"], 2);
}

#[test]
fn item_order_and_response_list_survive_verbatim() {
    let report = enrich_phrases(batch(json!({
        "responses": [
            { "id": "r_2", "sentence": "second" },
            { "id": "r_1", "sentence": "first" }
        ],
        "phrases": [
            { "text": "zeta", "mentions": [] },
            { "text": "alpha", "mentions": [] }
        ]
    })));
    let order: Vec<&str> = report.phrases.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(order, vec!["zeta", "alpha"]);
    assert_eq!(report.responses[0].id, "r_2");
    assert_eq!(report.responses[1].id, "r_1");
}

#[test]
fn reenriching_is_byte_identical() {
    let raw = json!({
        "responses": [
            { "id": "r_1", "sentence": "good", "sentiment": "positive",
              "segment": { "age": "18-25" } },
            { "id": "r_2", "sentence": "bad", "sentiment": "negative" }
        ],
        "phrases": [
            { "text": "service", "mentions": ["r_1", "r_2", "r_x"] }
        ]
    });
    let first = serde_json::to_string(&enrich_phrases(batch(raw.clone()))).unwrap();
    let second = serde_json::to_string(&enrich_phrases(batch(raw))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn provider_summary_never_survives() {
    // A summary on the wire is dropped at the boundary and recomputed.
    let report = enrich_phrases(batch(json!({
        "responses": [],
        "phrases": [
            { "text": "support", "mentions": [],
              "summary": { "total_mentions": 999 } }
        ]
    })));
    assert_eq!(report.phrases[0].summary.total_mentions, 0);
}
