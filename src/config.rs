// src/config.rs
//! Insight engine configuration.
//!
//! An explicit value threaded through the façade constructors; nothing in
//! the core reads ambient global state. Loadable from a JSON file or from
//! environment variables (`.env` is honored by the binary entrypoint).

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

use crate::error::InsightError;
use crate::provider::ProviderKind;

fn default_top_count() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// "local" | "openai" | "claude" (case-insensitive). Absent means each
    /// insight type applies its documented fallback.
    #[serde(default)]
    pub provider: Option<String>,
    /// How many extreme comments each sentiment report keeps per polarity.
    #[serde(default = "default_top_count")]
    pub top_count: usize,
    #[serde(default)]
    pub openai_model: Option<String>,
    #[serde(default)]
    pub claude_model: Option<String>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            provider: None,
            top_count: default_top_count(),
            openai_model: None,
            claude_model: None,
        }
    }
}

impl InsightConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: InsightConfig = serde_json::from_str(&data)?;
        cfg.normalize();
        Ok(cfg)
    }

    /// Build from `INSIGHT_*` environment variables; unset variables keep
    /// the defaults. API keys are not read here; each provider resolves
    /// its own key.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(provider) = env::var("INSIGHT_PROVIDER") {
            if !provider.trim().is_empty() {
                cfg.provider = Some(provider);
            }
        }
        if let Ok(raw) = env::var("INSIGHT_TOP_COUNT") {
            if let Ok(n) = raw.trim().parse() {
                cfg.top_count = n;
            }
        }
        if let Ok(model) = env::var("INSIGHT_OPENAI_MODEL") {
            cfg.openai_model = Some(model);
        }
        if let Ok(model) = env::var("INSIGHT_CLAUDE_MODEL") {
            cfg.claude_model = Some(model);
        }
        cfg.normalize();
        cfg
    }

    fn normalize(&mut self) {
        if let Some(provider) = &mut self.provider {
            *provider = provider.trim().to_lowercase();
        }
    }

    /// Resolve the configured identifier against the closed provider set.
    /// Unset falls back to the local lexicon.
    pub fn provider_kind(&self) -> Result<ProviderKind, InsightError> {
        match self.provider.as_deref() {
            None => Ok(ProviderKind::Local),
            Some(s) => ProviderKind::parse(s),
        }
    }
}
