//! decision.rs: maps a `ScoreCard` to a binary label.
//!
//! Order is fixed: hard exclusion, hard inclusion, corroborated threshold, then the
//! default-negative fallback. Exclusion wins whenever both kinds of gate fire.

use serde::{Deserialize, Serialize};

use crate::article::Label;
use crate::lexicon::{ConfidenceCfg, Policy};
use crate::scorer::{GateEffect, ScoreCard};

/// Which step of the policy produced the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    ExclusionGate,
    InclusionGate,
    Threshold,
    /// Nothing conclusive; resolved to label 0.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub label: Label,
    pub outcome: Outcome,
    pub confidence: Confidence,
    pub score: i32,
    /// Short machine-readable markers, e.g. `gate:exclude:...`, `threshold_ok:3`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl Decision {
    fn new(label: Label, outcome: Outcome, confidence: Confidence, score: i32) -> Self {
        Self {
            label,
            outcome,
            confidence,
            score,
            reasons: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    /// Default-negative outcomes are kept apart so rules can be refined later.
    pub fn is_ambiguous(&self) -> bool {
        self.outcome == Outcome::Default
    }
}

/// Confidence tier from the magnitude of the score.
pub fn confidence_for(score: i32, cfg: &ConfidenceCfg) -> Confidence {
    let s = score.abs();
    if s >= cfg.high {
        Confidence::High
    } else if s >= cfg.medium {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn decide(card: &ScoreCard, policy: &Policy) -> Decision {
    let tier = confidence_for(card.total, &policy.confidence);

    // 1) Hard exclusion
    if let Some(g) = card.gates_with(GateEffect::Exclude).next() {
        return Decision::new(Label::NonAutomotive, Outcome::ExclusionGate, tier, card.total)
            .with_reason(format!("gate:{}", g.name));
    }

    // 2) Hard inclusion
    if let Some(g) = card.gates_with(GateEffect::Include).next() {
        return Decision::new(Label::Automotive, Outcome::InclusionGate, tier, card.total)
            .with_reason(format!("gate:{}", g.name));
    }

    // 3) Threshold with corroboration (an empty corroborating set means threshold alone)
    if card.total >= policy.threshold {
        let corroboration = if policy.corroborating.is_empty() {
            Some("threshold_only")
        } else {
            policy
                .corroborating
                .iter()
                .find(|s| card.has_signal(s))
                .map(String::as_str)
        };
        if let Some(sig) = corroboration {
            return Decision::new(Label::Automotive, Outcome::Threshold, tier, card.total)
                .with_reason(format!("threshold_ok:{}", policy.threshold))
                .with_reason(format!("corroborated:{sig}"));
        }
        return Decision::new(Label::DEFAULT, Outcome::Default, Confidence::Low, card.total)
            .with_reason(format!("threshold_ok:{}", policy.threshold))
            .with_reason("uncorroborated");
    }

    // 4) Default-negative
    Decision::new(Label::DEFAULT, Outcome::Default, Confidence::Low, card.total)
        .with_reason(format!("threshold_fail:{}", policy.threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::Gate;

    fn policy(threshold: i32, corroborating: &[&str]) -> Policy {
        Policy {
            threshold,
            corroborating: corroborating.iter().map(|s| s.to_string()).collect(),
            confidence: ConfidenceCfg::default(),
        }
    }

    fn card(total: i32, gates: &[(&str, GateEffect)], signals: &[&str]) -> ScoreCard {
        ScoreCard {
            total,
            gates: gates
                .iter()
                .map(|(n, e)| Gate {
                    name: n.to_string(),
                    effect: *e,
                })
                .collect(),
            signals: signals.iter().map(|s| s.to_string()).collect(),
            ..ScoreCard::default()
        }
    }

    #[test]
    fn exclusion_beats_inclusion() {
        let c = card(
            0,
            &[
                ("include:maker:현대차", GateEffect::Include),
                ("exclude:other:uam", GateEffect::Exclude),
            ],
            &[],
        );
        let d = decide(&c, &policy(3, &["maker"]));
        assert_eq!(d.label, Label::NonAutomotive);
        assert_eq!(d.outcome, Outcome::ExclusionGate);
        assert_eq!(d.reasons, vec!["gate:exclude:other:uam"]);
    }

    #[test]
    fn threshold_needs_corroboration() {
        let p = policy(3, &["maker"]);
        assert_eq!(decide(&card(3, &[], &["maker"]), &p).label, Label::Automotive);
        assert_eq!(decide(&card(2, &[], &["maker"]), &p).label, Label::NonAutomotive);

        let uncorroborated = decide(&card(9, &[], &["action"]), &p);
        assert_eq!(uncorroborated.label, Label::NonAutomotive);
        assert!(uncorroborated.is_ambiguous());
        assert!(uncorroborated.reasons.iter().any(|r| r == "uncorroborated"));
    }

    #[test]
    fn default_is_low_confidence() {
        let d = decide(&ScoreCard::default(), &policy(3, &[]));
        assert_eq!(d.label, Label::NonAutomotive);
        assert_eq!(d.confidence, Confidence::Low);
        assert!(d.is_ambiguous());
    }

    #[test]
    fn tiers_follow_magnitude() {
        let cfg = ConfidenceCfg::default();
        assert_eq!(confidence_for(5, &cfg), Confidence::High);
        assert_eq!(confidence_for(-3, &cfg), Confidence::Medium);
        assert_eq!(confidence_for(2, &cfg), Confidence::Low);
    }

    #[test]
    fn serialize_decision_shape() {
        let d = decide(&card(6, &[], &["maker"]), &policy(3, &["maker"]));
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["label"], serde_json::json!(1));
        assert_eq!(v["outcome"], serde_json::json!("threshold"));
        assert_eq!(v["confidence"], serde_json::json!("HIGH"));
        assert!(v["reasons"].is_array());
    }
}
