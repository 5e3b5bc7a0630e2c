// src/config/llm.rs
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};

pub const DEFAULT_LLM_CONFIG_PATH: &str = "config/llm.json";
pub const ENV_LLM_CONFIG_PATH: &str = "LLM_CONFIG_PATH";
pub const ENV_LLM_BASE_URL: &str = "LLM_BASE_URL";
pub const ENV_LLM_MODEL: &str = "LLM_MODEL";

const MIN_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 60;

fn default_temperature() -> f32 {
    0.1
}
fn default_max_tokens() -> u32 {
    10
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions` (OpenAI, LM Studio).
    Openai,
    /// Ollama `/api/generate`.
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" | "ollama" (case-insensitive)
    pub provider: String,
    /// e.g. `http://localhost:1234/v1` for LM Studio, `http://localhost:11434` for Ollama.
    pub base_url: String,
    pub model: String,
    /// "ENV" means: read LLM_API_KEY, then OPENAI_API_KEY. Empty = no auth header.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Load from `LLM_CONFIG_PATH` or `config/llm.json`.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = env::var(ENV_LLM_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_LLM_CONFIG_PATH.to_string());
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read LLM config at {}", path.display()))?;
        let cfg: LlmConfig = serde_json::from_str(&data)
            .with_context(|| format!("malformed LLM config {}", path.display()))?;
        cfg.resolve()
    }

    /// Normalize fields, apply env overrides, resolve the API key.
    pub fn resolve(mut self) -> anyhow::Result<Self> {
        self.provider = self.provider.trim().to_lowercase();
        self.kind()?;

        if let Ok(url) = env::var(ENV_LLM_BASE_URL) {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(model) = env::var(ENV_LLM_MODEL) {
            if !model.trim().is_empty() {
                self.model = model;
            }
        }
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if self.base_url.is_empty() {
            bail!("LLM config has an empty base_url");
        }

        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = env::var("LLM_API_KEY")
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .map_err(|_| anyhow::anyhow!("Missing LLM_API_KEY / OPENAI_API_KEY env var"))?;
        }

        self.timeout_secs = self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        if !(0.0..=2.0).contains(&self.temperature) {
            self.temperature = default_temperature();
        }
        Ok(self)
    }

    pub fn kind(&self) -> anyhow::Result<ProviderKind> {
        match self.provider.as_str() {
            "openai" => Ok(ProviderKind::Openai),
            "ollama" => Ok(ProviderKind::Ollama),
            other => bail!("Unsupported provider in config: {other}"),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
