// src/provider/lexicon.rs
//! Local lexicon sentiment provider: the zero-network fallback.
//!
//! Scores each answer against an embedded word-weight table with a small
//! negation window. Structurally cannot extract phrases or entities; the
//! façade refuses to construct an extraction insight over it.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::ProviderClient;
use crate::error::InsightError;
use crate::types::{
    Entry, ExtractOptions, ExtractionBatch, ExtractionTarget, SentimentLabel, SentimentResult,
};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Largest absolute word weight in the lexicon; normalizes raw scores
/// into [-1.0, 1.0].
const MAX_WORD_WEIGHT: f64 = 5.0;

#[derive(Debug, Clone, Default)]
pub struct LexiconProvider;

impl LexiconProvider {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (raw score, count of lexicon hits).
    /// Negation: a negator within the preceding 1..=3 tokens inverts the
    /// sign of the word's lexicon score.
    fn score_text(text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;
        let mut hits: usize = 0;

        for i in 0..tokens.len() {
            let base = Self::word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
            hits += 1;
        }

        (score, hits)
    }

    fn result_for(text: &str) -> SentimentResult {
        let (raw, hits) = Self::score_text(text);
        if hits == 0 {
            // No lexicon words at all (including empty/whitespace answers).
            return SentimentResult {
                label: Some(SentimentLabel::Neutral),
                score: Some(0.0),
            };
        }
        let score = (raw as f64 / (MAX_WORD_WEIGHT * hits as f64)).clamp(-1.0, 1.0);
        let label = match raw {
            r if r > 0 => SentimentLabel::Positive,
            r if r < 0 => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        };
        SentimentResult {
            label: Some(label),
            score: Some(score),
        }
    }
}

#[async_trait]
impl ProviderClient for LexiconProvider {
    async fn analyze_entries(
        &self,
        entries: &[Entry],
        _question: Option<&str>,
    ) -> Result<Vec<SentimentResult>, InsightError> {
        Ok(entries
            .iter()
            .map(|entry| Self::result_for(&entry.answer))
            .collect())
    }

    // Unreachable through the façade, which refuses at construction; kept
    // total so the trait object stays well-formed.
    async fn extract_batch(
        &self,
        _entries: &[Entry],
        _question: Option<&str>,
        target: ExtractionTarget,
        _options: &ExtractOptions,
    ) -> Result<ExtractionBatch, InsightError> {
        Err(InsightError::Unsupported {
            provider: "local",
            capability: match target {
                ExtractionTarget::Phrases => "key-phrase extraction",
                ExtractionTarget::Entities => "entity extraction",
            },
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// Single-token negators; "no longer" is already covered by "no".
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
    )
}
