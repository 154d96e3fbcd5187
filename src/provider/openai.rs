// src/provider/openai.rs
//! OpenAI chat transport (Chat Completions API). Requires `OPENAI_API_KEY`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::llm::ChatTransport;
use crate::error::InsightError;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// `model_override`: pass Some("gpt-4o") to override; defaults to gpt-4o-mini.
    /// The key is read at construction and checked at call time, so a
    /// keyless environment still constructs (and fails loudly on use).
    pub fn from_env(model_override: Option<&str>) -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
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
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: String,
}

#[async_trait]
impl ChatTransport for OpenAiProvider {
    async fn chat(&self, system: &str, user: &str) -> Result<String, InsightError> {
        if self.api_key.is_empty() {
            return Err(InsightError::MissingApiKey("OPENAI_API_KEY"));
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
            max_tokens: 2048,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;

        let body: Resp = resp.json().await?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
