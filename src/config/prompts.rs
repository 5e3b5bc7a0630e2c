// src/config/prompts.rs
//! Prompt variants for the model-backed classifier, loaded from TOML:
//!
//! ```toml
//! [[prompts]]
//! name = "minimal"
//! text = "자동차 산업 기사면 1, 아니면 0만 출력."
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const DEFAULT_PROMPTS_PATH: &str = "config/prompts.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PromptVariant {
    pub name: String,
    pub text: String,
}

impl PromptVariant {
    /// Scored length in Unicode scalar values.
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Deserialize)]
struct PromptsRoot {
    #[serde(default)]
    prompts: Vec<PromptVariant>,
}

pub fn load_prompts(path: &Path) -> Result<Vec<PromptVariant>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read prompts at {}", path.display()))?;
    parse_prompts(&raw).with_context(|| format!("invalid prompts file {}", path.display()))
}

pub fn parse_prompts(raw: &str) -> Result<Vec<PromptVariant>> {
    let root: PromptsRoot = toml::from_str(raw).context("malformed prompts TOML")?;
    if root.prompts.is_empty() {
        bail!("no [[prompts]] entries");
    }
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(root.prompts.len());
    for p in root.prompts {
        let name = p.name.trim().to_string();
        if name.is_empty() {
            bail!("prompt with empty name");
        }
        if p.text.trim().is_empty() {
            bail!("prompt '{name}' has empty text");
        }
        if !seen.insert(name.clone()) {
            bail!("duplicate prompt name '{name}'");
        }
        out.push(PromptVariant {
            name,
            text: p.text.trim().to_string(),
        });
    }
    Ok(out)
}
