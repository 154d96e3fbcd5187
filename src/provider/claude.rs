// src/provider/claude.rs
//! Claude chat transport (Anthropic Messages API). Requires `CLAUDE_API_KEY`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::llm::ChatTransport;
use crate::error::InsightError;

const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeProvider {
    pub fn from_env(model_override: Option<&str>) -> Self {
        let api_key = std::env::var("CLAUDE_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("survey-insights/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ChatTransport for ClaudeProvider {
    async fn chat(&self, system: &str, user: &str) -> Result<String, InsightError> {
        if self.api_key.is_empty() {
            return Err(InsightError::MissingApiKey("CLAUDE_API_KEY"));
        }

        let req = Req {
            model: &self.model,
            max_tokens: 2048,
            temperature: 0.0,
            system,
            messages: vec![Msg {
                role: "user",
                content: user,
            }],
        };

        let resp = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;

        let body: Resp = resp.json().await?;
        // Concatenate text blocks; tool/other block types deserialize with
        // empty text and contribute nothing.
        Ok(body
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }

    fn name(&self) -> &'static str {
        "claude"
    }
}
