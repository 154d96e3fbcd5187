// src/provider/llm.rs
//! Shared plumbing for the hosted LLM providers.
//!
//! `LlmClient<T>` wraps a low-level chat transport (OpenAI, Claude) and owns
//! everything the transports have in common: chunking, prompt assembly,
//! strict-JSON parsing with bounded retry, and normalization of model output
//! into the common batch shape (lower-cased item text, per-identity mention
//! merge, locally assigned `r_<n>` response IDs).

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write as _;

use super::{with_backoff, ProviderClient};
use crate::error::InsightError;
use crate::types::{
    Entry, ExtractOptions, ExtractedResponse, ExtractionBatch, ExtractionTarget, MentionItem,
    SentimentLabel, SentimentResult,
};

/// Provider-side batch size for hosted calls.
const CHUNK_SIZE: usize = 25;

/// Low-level transport: one prompt in, raw model text out. Separated from
/// the client so the same chunking/normalization serves every hosted
/// provider, and so tests can script responses without a network.
#[async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    async fn chat(&self, system: &str, user: &str) -> Result<String, InsightError>;
    fn name(&self) -> &'static str;
}

pub struct LlmClient<T: ChatTransport> {
    transport: T,
}

impl<T: ChatTransport> LlmClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    async fn sentiment_chunk(
        &self,
        chunk: &[Entry],
        question: Option<&str>,
    ) -> Result<Vec<SentimentResult>, InsightError> {
        let user = sentiment_user_prompt(chunk, question);
        let content = self.transport.chat(SENTIMENT_SYSTEM, &user).await?;
        parse_sentiment_payload(&content)
    }

    async fn extraction_chunk(
        &self,
        chunk: &[Entry],
        ids: &[String],
        question: Option<&str>,
        target: ExtractionTarget,
        options: &ExtractOptions,
    ) -> Result<RawExtractionPayload, InsightError> {
        let system = extraction_system_prompt(target, options);
        let user = extraction_user_prompt(chunk, ids, question);
        let content = self.transport.chat(&system, &user).await?;
        parse_extraction_payload(&content)
    }
}

#[async_trait]
impl<T: ChatTransport> ProviderClient for LlmClient<T> {
    async fn analyze_entries(
        &self,
        entries: &[Entry],
        question: Option<&str>,
    ) -> Result<Vec<SentimentResult>, InsightError> {
        let mut out = Vec::with_capacity(entries.len());
        for chunk in entries.chunks(CHUNK_SIZE) {
            let mut parsed =
                with_backoff("llm.sentiment", || self.sentiment_chunk(chunk, question)).await?;
            // Pad (or trim) to the chunk length so every later chunk stays
            // positionally aligned with its entries.
            parsed.resize_with(chunk.len(), SentimentResult::default);
            out.append(&mut parsed);
        }
        Ok(out)
    }

    async fn extract_batch(
        &self,
        entries: &[Entry],
        question: Option<&str>,
        target: ExtractionTarget,
        options: &ExtractOptions,
    ) -> Result<ExtractionBatch, InsightError> {
        let mut responses = Vec::with_capacity(entries.len());
        let mut items: Vec<MentionItem> = Vec::new();
        // Identity is (lower-cased text) for phrases, (lower-cased text,
        // type) for entities. Merging duplicates is this client's job; the
        // aggregator downstream never merges.
        let mut index: HashMap<(String, Option<String>), usize> = HashMap::new();

        for (chunk_no, chunk) in entries.chunks(CHUNK_SIZE).enumerate() {
            let offset = chunk_no * CHUNK_SIZE;
            let ids: Vec<String> = (0..chunk.len())
                .map(|i| format!("r_{}", offset + i + 1))
                .collect();
            let payload = with_backoff("llm.extract", || {
                self.extraction_chunk(chunk, &ids, question, target, options)
            })
            .await?;

            let mut label_by_id: HashMap<String, Option<SentimentLabel>> = HashMap::new();
            for s in &payload.sentiments {
                label_by_id.insert(
                    s.id.clone(),
                    s.label.as_deref().and_then(SentimentLabel::parse),
                );
            }
            for (i, entry) in chunk.iter().enumerate() {
                responses.push(ExtractedResponse {
                    id: ids[i].clone(),
                    sentence: entry.answer.clone(),
                    segment: entry.segment.clone(),
                    sentiment: label_by_id.get(&ids[i]).copied().flatten(),
                });
            }

            for raw in payload.into_items() {
                let text = raw.text.trim().to_lowercase();
                let kind = match target {
                    ExtractionTarget::Phrases => None,
                    ExtractionTarget::Entities => raw.kind.map(|k| k.trim().to_uppercase()),
                };
                let mentions = raw.mentions.unwrap_or_default();
                match index.get(&(text.clone(), kind.clone())) {
                    Some(&at) => {
                        items[at]
                            .mentions
                            .get_or_insert_with(Vec::new)
                            .extend(mentions);
                    }
                    None => {
                        index.insert((text.clone(), kind.clone()), items.len());
                        items.push(MentionItem {
                            text,
                            kind,
                            mentions: Some(mentions),
                        });
                    }
                }
            }
        }

        let mut batch = ExtractionBatch {
            responses,
            ..ExtractionBatch::default()
        };
        match target {
            ExtractionTarget::Phrases => batch.phrases = items,
            ExtractionTarget::Entities => batch.entities = items,
        }
        Ok(batch)
    }

    fn name(&self) -> &'static str {
        self.transport.name()
    }
}

// ------------------------------------------------------------
// Prompts
// ------------------------------------------------------------

const SENTIMENT_SYSTEM: &str = "You classify survey answers by sentiment. Reply with ONLY a JSON \
array, one object per numbered answer in input order, each shaped \
{\"label\":\"positive\"|\"neutral\"|\"negative\",\"score\":<float in [-1,1]>}. \
No commentary, no code fences.";

fn sentiment_user_prompt(chunk: &[Entry], question: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(q) = question {
        let _ = writeln!(out, "Survey question: {q}");
        out.push('\n');
    }
    out.push_str("Answers:\n");
    for (i, entry) in chunk.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, entry.answer);
    }
    out
}

fn extraction_system_prompt(target: ExtractionTarget, options: &ExtractOptions) -> String {
    let mut out = String::new();
    match target {
        ExtractionTarget::Phrases => {
            out.push_str(
                "Extract the recurring key phrases across the survey answers. \
                 Lower-case every phrase. ",
            );
        }
        ExtractionTarget::Entities => {
            out.push_str(
                "Extract the named entities (ORGANIZATION, PRODUCT, PERSON, LOCATION, EVENT) \
                 across the survey answers. Lower-case the entity text and put the category \
                 in \"type\". ",
            );
        }
    }
    out.push_str(
        "Also give a sentiment label for every answer id. Reply with ONLY JSON shaped \
         {\"sentiments\":[{\"id\":\"r_1\",\"label\":\"positive\"}],\
         \"items\":[{\"text\":\"...\",",
    );
    if target == ExtractionTarget::Entities {
        out.push_str("\"type\":\"PRODUCT\",");
    }
    out.push_str(
        "\"mentions\":[\"r_1\"]}]}. \"mentions\" lists every answer id where the item occurs. \
         No commentary, no code fences.",
    );
    if let Some(n) = options.max_items {
        let _ = write!(out, " Return at most {n} items.");
    }
    if let Some(guidance) = &options.guidance {
        out.push(' ');
        out.push_str(guidance);
    }
    out
}

fn extraction_user_prompt(chunk: &[Entry], ids: &[String], question: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(q) = question {
        let _ = writeln!(out, "Survey question: {q}");
        out.push('\n');
    }
    out.push_str("Answers:\n");
    for (entry, id) in chunk.iter().zip(ids) {
        let _ = writeln!(out, "{}. {}", id, entry.answer);
    }
    out
}

// ------------------------------------------------------------
// Model output decoding
// ------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSentiment {
    label: Option<String>,
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SentimentEnvelope {
    sentiments: Vec<RawSentiment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawIdSentiment {
    id: String,
    label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawExtractedItem {
    text: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    mentions: Option<Vec<String>>,
}

/// Lenient decode of the extraction reply. Models occasionally answer with
/// a `phrases`/`entities` key despite being asked for `items`; accept all.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawExtractionPayload {
    sentiments: Vec<RawIdSentiment>,
    items: Vec<RawExtractedItem>,
    phrases: Vec<RawExtractedItem>,
    entities: Vec<RawExtractedItem>,
}

impl RawExtractionPayload {
    fn into_items(self) -> impl Iterator<Item = RawExtractedItem> {
        self.items
            .into_iter()
            .chain(self.phrases)
            .chain(self.entities)
    }
}

/// Trim optional Markdown code fences around a JSON body.
fn strip_code_fences(s: &str) -> &str {
    let t = s.trim();
    let t = t
        .strip_prefix("```json")
        .or_else(|| t.strip_prefix("```"))
        .unwrap_or(t);
    let t = t.strip_suffix("```").unwrap_or(t);
    t.trim()
}

fn parse_sentiment_payload(content: &str) -> Result<Vec<SentimentResult>, InsightError> {
    let body = strip_code_fences(content);
    let raw = match serde_json::from_str::<Vec<RawSentiment>>(body) {
        Ok(list) => list,
        Err(first) => serde_json::from_str::<SentimentEnvelope>(body)
            .map(|e| e.sentiments)
            .map_err(|_| first)?,
    };
    Ok(raw
        .into_iter()
        .map(|r| SentimentResult {
            label: r.label.as_deref().and_then(SentimentLabel::parse),
            score: r.score,
        })
        .collect())
}

fn parse_extraction_payload(content: &str) -> Result<RawExtractionPayload, InsightError> {
    Ok(serde_json::from_str(strip_code_fences(content))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn sentiment_payload_accepts_bare_array_and_envelope() {
        let bare = r#"[{"label":"positive","score":0.7},{"label":"weird"}]"#;
        let parsed = parse_sentiment_payload(bare).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].label, Some(SentimentLabel::Positive));
        assert_eq!(parsed[1].label, None); // unrecognized label -> unscored

        let envelope = r#"{"sentiments":[{"label":"negative","score":-0.4}]}"#;
        let parsed = parse_sentiment_payload(envelope).unwrap();
        assert_eq!(parsed[0].label, Some(SentimentLabel::Negative));
    }

    #[test]
    fn garbage_sentiment_payload_is_a_payload_error() {
        let err = parse_sentiment_payload("the vibes are good").unwrap_err();
        assert!(matches!(err, InsightError::Payload(_)));
    }

    #[test]
    fn extraction_payload_accepts_alternate_item_keys() {
        let body = r#"{"sentiments":[],"phrases":[{"text":"Fast Checkout","mentions":["r_1"]}]}"#;
        let payload = parse_extraction_payload(body).unwrap();
        let items: Vec<_> = payload.into_items().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "Fast Checkout");
    }

    #[test]
    fn prompts_number_answers_and_carry_the_question() {
        let chunk = vec![Entry::new("loved it"), Entry::new("too slow")];
        let user = sentiment_user_prompt(&chunk, Some("How was checkout?"));
        assert!(user.contains("Survey question: How was checkout?"));
        assert!(user.contains("1. loved it"));
        assert!(user.contains("2. too slow"));

        let ids = vec!["r_1".to_string(), "r_2".to_string()];
        let user = extraction_user_prompt(&chunk, &ids, None);
        assert!(user.contains("r_2. too slow"));
    }

    #[test]
    fn entity_prompt_mentions_type_and_options() {
        let options = ExtractOptions {
            max_items: Some(10),
            guidance: Some("Prefer product names.".to_string()),
        };
        let system = extraction_system_prompt(ExtractionTarget::Entities, &options);
        assert!(system.contains("\"type\":\"PRODUCT\""));
        assert!(system.contains("at most 10 items"));
        assert!(system.contains("Prefer product names."));
    }
}
