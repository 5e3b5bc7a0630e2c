// src/lexicon.rs
//! Lexicon: categorized trigger phrases with weights, gates and caps, loaded once
//! from TOML and validated before any article is classified.

use anyhow::{anyhow, bail, Context};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::article::normalize;

// --- env defaults & names ---
pub const DEFAULT_LEXICON_PATH: &str = "config/lexicon.toml";
pub const ENV_LEXICON_PATH: &str = "LEXICON_PATH";
pub const ENV_LEXICON_THRESHOLD: &str = "LEXICON_THRESHOLD";

/// Reserved corroborating-signal names that are not categories.
pub const SIGNAL_COOCCURRENCE: &str = "cooccurrence";
pub const SIGNAL_VEHICLE_USE: &str = "vehicle_use";

fn parse_threshold_env(raw: Option<String>) -> Option<i32> {
    raw.and_then(|s| s.trim().parse::<i32>().ok())
}

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct LexiconRoot {
    pub policy: PolicySection,
    #[serde(default)]
    pub categories: Vec<CategoryCfg>,
    #[serde(default)]
    pub ambiguous: Vec<AmbiguousCfg>,
    #[serde(default)]
    pub exceptions: Vec<ExceptionCfg>,
    #[serde(default)]
    pub cooccurrence: Option<CooccurrenceCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicySection {
    pub threshold: i32,
    /// Category names (or `cooccurrence` / `vehicle_use`) that corroborate a threshold pass.
    #[serde(default)]
    pub corroborating: Vec<String>,
    /// Cap applied to categories that do not set their own. `None` = every distinct phrase counts.
    #[serde(default)]
    pub default_cap: Option<usize>,
    #[serde(default)]
    pub confidence: ConfidenceCfg,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceCfg {
    pub high: i32,
    pub medium: i32,
}

impl Default for ConfidenceCfg {
    fn default() -> Self {
        Self { high: 5, medium: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    StrongInclusion,
    ModerateInclusion,
    Action,
    Exclusion,
    /// Explicit "for vehicle use" wording.
    Qualifier,
    Model,
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    Include,
    Exclude,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCfg {
    pub name: String,
    pub role: Role,
    pub weight: i32,
    #[serde(default)]
    pub cap: Option<usize>,
    #[serde(default)]
    pub gate: Option<GateKind>,
    #[serde(default)]
    pub phrases: Vec<String>,
    /// Regexes, matched case-insensitively against the normalized text.
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmbiguousCfg {
    pub term: String,
    #[serde(default)]
    pub weight: i32,
    #[serde(default)]
    pub vehicle_context: Vec<String>,
    #[serde(default)]
    pub other_context: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionCfg {
    pub trigger: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Sentence,
    Document,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CooccurrenceCfg {
    pub subjects: Vec<String>,
    pub actions: Vec<String>,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub bonus: i32,
}

/* ----------------------------
Compiled lexicon
---------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexiconEntry {
    pub phrase: String,
    pub weight: i32,
    pub category: String,
}

#[derive(Debug)]
pub struct Category {
    pub name: String,
    pub role: Role,
    pub weight: i32,
    pub cap: Option<usize>,
    pub gate: Option<GateKind>,
    pub phrases: Vec<String>,
    pub patterns: Vec<Regex>,
}

#[derive(Debug, Clone)]
pub struct AmbiguousTerm {
    pub term: String,
    pub weight: i32,
    pub vehicle_context: Vec<String>,
    pub other_context: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DisambiguationException {
    pub trigger: String,
    pub context: String,
}

#[derive(Debug, Clone)]
pub struct Cooccurrence {
    pub subjects: Vec<String>,
    pub actions: Vec<String>,
    pub scope: Scope,
    pub bonus: i32,
}

#[derive(Debug, Clone)]
pub struct Policy {
    pub threshold: i32,
    pub corroborating: Vec<String>,
    pub confidence: ConfidenceCfg,
}

#[derive(Debug)]
pub struct Lexicon {
    pub policy: Policy,
    categories: Vec<Category>,
    ambiguous: Vec<AmbiguousTerm>,
    exceptions: Vec<DisambiguationException>,
    cooccurrence: Option<Cooccurrence>,
    source_len: usize,
}

impl Lexicon {
    /// Load using `LEXICON_PATH` or `config/lexicon.toml`; `LEXICON_THRESHOLD` overrides the threshold.
    pub fn from_default_path() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_LEXICON_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LEXICON_PATH));
        let mut lex = Self::from_file(&path)?;
        if let Some(t) = parse_threshold_env(std::env::var(ENV_LEXICON_THRESHOLD).ok()) {
            lex.policy.threshold = t;
        }
        Ok(lex)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read lexicon at {}", path.display()))?;
        let lex = Self::from_toml_str(&content)
            .with_context(|| format!("invalid lexicon {}", path.display()))?;
        info!(
            path = %path.display(),
            categories = lex.categories.len(),
            threshold = lex.policy.threshold,
            "lexicon loaded"
        );
        Ok(lex)
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let root: LexiconRoot =
            toml::from_str(toml_str).map_err(|e| anyhow!("malformed lexicon: {e}"))?;
        let mut lex = Self::compile(root)?;
        lex.source_len = toml_str.chars().count();
        Ok(lex)
    }

    fn compile(root: LexiconRoot) -> anyhow::Result<Self> {
        if root.categories.is_empty() {
            bail!("lexicon defines no categories");
        }

        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(root.categories.len());
        for c in root.categories {
            let name = c.name.trim().to_string();
            if name.is_empty() {
                bail!("category with empty name");
            }
            if name == SIGNAL_COOCCURRENCE || name == SIGNAL_VEHICLE_USE {
                bail!("category `{name}` uses a reserved signal name");
            }
            if !seen.insert(name.clone()) {
                bail!("duplicate category `{name}`");
            }
            let phrases = clean_phrases(&c.phrases);
            if phrases.is_empty() && c.patterns.is_empty() {
                bail!("category `{name}` has neither phrases nor patterns");
            }
            let patterns = c
                .patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| anyhow!("category `{name}` pattern `{p}` regex error: {e}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            categories.push(Category {
                cap: c.cap.or(root.policy.default_cap),
                phrases,
                patterns,
                name,
                role: c.role,
                weight: c.weight,
                gate: c.gate,
            });
        }

        for name in &root.policy.corroborating {
            if name != SIGNAL_COOCCURRENCE && name != SIGNAL_VEHICLE_USE && !seen.contains(name) {
                bail!("policy.corroborating references unknown category `{name}`");
            }
        }

        let cooccurrence = match root.cooccurrence {
            Some(cc) => {
                for name in cc.subjects.iter().chain(cc.actions.iter()) {
                    if !seen.contains(name) {
                        bail!("cooccurrence references unknown category `{name}`");
                    }
                }
                if cc.subjects.is_empty() || cc.actions.is_empty() {
                    bail!("cooccurrence needs at least one subject and one action category");
                }
                Some(Cooccurrence {
                    subjects: cc.subjects,
                    actions: cc.actions,
                    scope: cc.scope,
                    bonus: cc.bonus,
                })
            }
            None => None,
        };

        let ambiguous = root
            .ambiguous
            .into_iter()
            .map(|a| {
                let term = normalize(&a.term);
                if term.is_empty() {
                    bail!("ambiguous entry with empty term");
                }
                Ok(AmbiguousTerm {
                    term,
                    weight: a.weight,
                    vehicle_context: clean_phrases(&a.vehicle_context),
                    other_context: clean_phrases(&a.other_context),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let exceptions = root
            .exceptions
            .into_iter()
            .map(|e| {
                let trigger = normalize(&e.trigger);
                let context = normalize(&e.context);
                if trigger.is_empty() || context.is_empty() {
                    bail!("disambiguation exception needs a trigger and a context");
                }
                Ok(DisambiguationException { trigger, context })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            policy: Policy {
                threshold: root.policy.threshold,
                corroborating: root.policy.corroborating,
                confidence: root.policy.confidence,
            },
            categories,
            ambiguous,
            exceptions,
            cooccurrence,
            source_len: 0,
        })
    }

    /// Phrases of a category in configuration order.
    pub fn lookup(&self, category: &str) -> Option<&[String]> {
        self.category(category).map(|c| c.phrases.as_slice())
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn ambiguous(&self) -> &[AmbiguousTerm] {
        &self.ambiguous
    }

    pub fn exceptions(&self) -> &[DisambiguationException] {
        &self.exceptions
    }

    pub fn cooccurrence(&self) -> Option<&Cooccurrence> {
        self.cooccurrence.as_ref()
    }

    /// Flat list of literal entries, for statistics and diagnostics.
    pub fn entries(&self) -> Vec<LexiconEntry> {
        self.categories
            .iter()
            .flat_map(|c| {
                c.phrases.iter().map(move |p| LexiconEntry {
                    phrase: p.clone(),
                    weight: c.weight,
                    category: c.name.clone(),
                })
            })
            .collect()
    }

    /// Character count of the TOML the lexicon was built from (its artifact length).
    pub fn source_len(&self) -> usize {
        self.source_len
    }
}

/// Normalize, drop empties, dedup while keeping first-seen order.
fn clean_phrases(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|p| normalize(p))
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[policy]
threshold = 3
corroborating = ["maker"]

[[categories]]
name = "maker"
role = "strong_inclusion"
weight = 3
phrases = ["Hyundai", "hyundai", " 기아 "]
"#;

    #[test]
    fn lookup_is_normalized_and_deduped() {
        let lex = Lexicon::from_toml_str(MINIMAL).expect("load");
        assert_eq!(lex.lookup("maker").unwrap(), &["hyundai", "기아"]);
        assert!(lex.lookup("nope").is_none());
        assert_eq!(lex.source_len(), MINIMAL.chars().count());
        assert_eq!(lex.policy.confidence.high, 5);
    }

    #[test]
    fn non_numeric_weight_fails_fast() {
        let bad = MINIMAL.replace("weight = 3", "weight = \"three\"");
        let err = Lexicon::from_toml_str(&bad).unwrap_err().to_string();
        assert!(err.contains("malformed lexicon"), "{err}");
    }

    #[test]
    fn unknown_corroborating_category_is_named() {
        let bad = MINIMAL.replace(r#"corroborating = ["maker"]"#, r#"corroborating = ["oem"]"#);
        let err = Lexicon::from_toml_str(&bad).unwrap_err().to_string();
        assert!(err.contains("`oem`"), "{err}");
    }

    #[test]
    fn missing_policy_section_fails() {
        let bad = MINIMAL.replace("[policy]\nthreshold = 3\ncorroborating = [\"maker\"]\n", "");
        assert!(Lexicon::from_toml_str(&bad).is_err());
    }

    #[test]
    fn bad_regex_is_reported_with_category() {
        let bad = format!(
            "{MINIMAL}\n[[categories]]\nname = \"qty\"\nrole = \"signal\"\nweight = 1\npatterns = [\"(\\\\d+\"]\n"
        );
        let err = Lexicon::from_toml_str(&bad).unwrap_err().to_string();
        assert!(err.contains("`qty`"), "{err}");
    }

    #[test]
    fn default_cap_is_inherited() {
        let capped = MINIMAL.replace("threshold = 3", "threshold = 3\ndefault_cap = 1");
        let lex = Lexicon::from_toml_str(&capped).unwrap();
        assert_eq!(lex.category("maker").unwrap().cap, Some(1));
    }

    #[test]
    fn whitespace_only_phrases_count_as_empty() {
        let blank = MINIMAL.replace(r#"["Hyundai", "hyundai", " 기아 "]"#, r#"["  ", "\t"]"#);
        let err = Lexicon::from_toml_str(&blank).unwrap_err().to_string();
        assert!(err.contains("neither phrases nor patterns"), "{err}");
    }
}
