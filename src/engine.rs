//! # Rule Engine
//! Pure, deterministic pipeline `Article → Matcher → Scorer → Decision`.
//! No I/O apart from debug logging, so it doubles as the offline classifier
//! that the evaluation harness replays.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::article::Article;
use crate::classifier::{Classifier, ClassifyError, Prediction};
use crate::decision::{decide, Decision};
use crate::lexicon::Lexicon;
use crate::scorer::{score_article, ScoreCard};

/// Full explanation of one rule-engine classification.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub article_id: String,
    pub decision: Decision,
    pub card: ScoreCard,
}

impl Classification {
    pub fn to_prediction(&self) -> Prediction {
        Prediction {
            score: Some(self.decision.score),
            outcome: Some(self.decision.outcome),
            confidence: Some(self.decision.confidence),
            matched: self.card.matched_phrases(),
            gates: self.card.gates.iter().map(|g| g.name.clone()).collect(),
            ..Prediction::label_only(self.decision.label)
        }
    }
}

pub struct RuleEngine {
    name: String,
    lexicon: Lexicon,
}

impl RuleEngine {
    pub fn new(name: impl Into<String>, lexicon: Lexicon) -> Self {
        Self {
            name: name.into(),
            lexicon,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn classify_article(&self, article: &Article) -> Classification {
        let card = score_article(&self.lexicon, article);
        let decision = decide(&card, &self.lexicon.policy);
        debug!(
            target: "rules",
            id = %anon_hash(&article.full_text()),
            score = card.total,
            label = %decision.label,
            outcome = ?decision.outcome,
            matched = ?truncate_vec(&card.matched_phrases(), 5),
            "classified"
        );
        Classification {
            article_id: article.id.clone(),
            decision,
            card,
        }
    }
}

#[async_trait]
impl Classifier for RuleEngine {
    async fn classify(&self, article: &Article) -> Result<Prediction, ClassifyError> {
        Ok(self.classify_article(article).to_prediction())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn artifact_len(&self) -> usize {
        self.lexicon.source_len()
    }
}

/// Short SHA-256 prefix so logs never carry article text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Label;
    use crate::decision::Outcome;

    const TOML: &str = r#"
[policy]
threshold = 3
corroborating = ["maker"]

[[categories]]
name = "maker"
role = "strong_inclusion"
weight = 3
phrases = ["hyundai"]

[[categories]]
name = "action"
role = "action"
weight = 2
phrases = ["launch"]
"#;

    #[test]
    fn anon_hash_is_stable_and_short() {
        assert_eq!(anon_hash("abc"), anon_hash("abc"));
        assert_eq!(anon_hash("abc").len(), 12);
        assert_ne!(anon_hash("abc"), anon_hash("abd"));
    }

    #[tokio::test]
    async fn classifier_impl_carries_explanation() {
        let eng = RuleEngine::new("rules", Lexicon::from_toml_str(TOML).unwrap());
        let p = eng
            .classify(&Article::new("A", "Hyundai launches new SUV", ""))
            .await
            .unwrap();
        assert_eq!(p.label, Label::Automotive);
        assert_eq!(p.score, Some(5));
        assert_eq!(p.outcome, Some(Outcome::Threshold));
        assert_eq!(p.matched, vec!["hyundai", "launch"]);
        assert_eq!(eng.artifact_len(), TOML.chars().count());
    }
}
