// src/scorer.rs
//! Scorer: turns matcher output into a signed total and the set of gates that fired.
//! Gates are evaluated over the article text, independently of the weighted sum.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::article::{Article, NormalizedText};
use crate::lexicon::{
    GateKind, Lexicon, Role, Scope, SIGNAL_COOCCURRENCE, SIGNAL_VEHICLE_USE,
};
use crate::matcher::{contains_any, find_matches, Match, MatchSet};

/// Pseudo-category used for resolved ambiguous terms in `ScoreCard::matched`.
pub const AMBIGUOUS_CATEGORY: &str = "ambiguous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateEffect {
    /// Hard exclusion: forces label 0.
    Exclude,
    /// Hard inclusion: forces label 1 unless an exclusion also fired.
    Include,
    /// Soft: only corroborates a threshold pass.
    Signal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gate {
    pub name: String,
    pub effect: GateEffect,
}

impl Gate {
    fn new(name: impl Into<String>, effect: GateEffect) -> Self {
        Self {
            name: name.into(),
            effect,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreCard {
    pub total: i32,
    /// Matches that contributed to `total`, in lexicon order.
    pub matched: Vec<Match>,
    /// Matches left out by a category cap.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capped: Vec<Match>,
    /// Matches removed by a disambiguation exception.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<Match>,
    pub gates: Vec<Gate>,
    /// Category names with at least one match, plus fired signal names.
    pub signals: BTreeSet<String>,
}

impl ScoreCard {
    pub fn gates_with(&self, effect: GateEffect) -> impl Iterator<Item = &Gate> {
        self.gates.iter().filter(move |g| g.effect == effect)
    }

    pub fn has_signal(&self, name: &str) -> bool {
        self.signals.contains(name)
    }

    pub fn matched_phrases(&self) -> Vec<String> {
        self.matched.iter().map(|m| m.phrase.clone()).collect()
    }
}

pub fn score_article(lex: &Lexicon, article: &Article) -> ScoreCard {
    score_text(lex, &NormalizedText::from_article(article))
}

pub fn score_text(lex: &Lexicon, text: &NormalizedText) -> ScoreCard {
    let set = find_matches(lex, text);
    let mut card = ScoreCard {
        suppressed: set.suppressed.clone(),
        ..ScoreCard::default()
    };

    // 1) Weighted sum with per-category caps
    for cat in lex.categories() {
        let cap = cat.cap.unwrap_or(usize::MAX);
        for (i, m) in set.in_category(&cat.name).enumerate() {
            if i < cap {
                card.total += m.weight;
                card.matched.push(m.clone());
            } else {
                card.capped.push(m.clone());
            }
        }
        if set.has_category(&cat.name) {
            card.signals.insert(cat.name.clone());
        }
    }

    let qualifier_present = lex
        .categories()
        .iter()
        .any(|c| c.role == Role::Qualifier && set.has_category(&c.name));
    if qualifier_present {
        card.signals.insert(SIGNAL_VEHICLE_USE.to_string());
    }

    // 2) Category gates; an explicit vehicle-use qualifier disarms exclusions
    for cat in lex.categories() {
        let Some(kind) = cat.gate else { continue };
        let Some(first) = set.in_category(&cat.name).next() else {
            continue;
        };
        match kind {
            GateKind::Exclude if qualifier_present => {}
            GateKind::Exclude => card.gates.push(Gate::new(
                format!("exclude:{}:{}", cat.name, first.phrase),
                GateEffect::Exclude,
            )),
            GateKind::Include => card.gates.push(Gate::new(
                format!("include:{}:{}", cat.name, first.phrase),
                GateEffect::Include,
            )),
        }
    }

    // 3) Ambiguous terms resolved by their qualifying context
    for amb in lex.ambiguous() {
        if !text.full.contains(amb.term.as_str()) {
            continue;
        }
        if contains_any(&text.full, &amb.vehicle_context) {
            card.total += amb.weight;
            card.matched.push(Match {
                phrase: amb.term.clone(),
                category: AMBIGUOUS_CATEGORY.to_string(),
                weight: amb.weight,
            });
            card.signals.insert(SIGNAL_VEHICLE_USE.to_string());
            card.gates.push(Gate::new(
                format!("ambiguous:{}:vehicle", amb.term),
                GateEffect::Signal,
            ));
        } else if !qualifier_present {
            if let Some(ctx) = amb
                .other_context
                .iter()
                .find(|c| text.full.contains(c.as_str()))
            {
                card.gates.push(Gate::new(
                    format!("ambiguous:{}:{}", amb.term, ctx),
                    GateEffect::Exclude,
                ));
            }
        }
    }

    // 4) Subject + action co-occurrence
    if let Some(cc) = lex.cooccurrence() {
        if cooccurs(&set, text, &cc.subjects, &cc.actions, cc.scope) {
            card.total += cc.bonus;
            card.signals.insert(SIGNAL_COOCCURRENCE.to_string());
            card.gates
                .push(Gate::new(SIGNAL_COOCCURRENCE, GateEffect::Signal));
        }
    }

    card
}

fn cooccurs(
    set: &MatchSet,
    text: &NormalizedText,
    subjects: &[String],
    actions: &[String],
    scope: Scope,
) -> bool {
    let phrases_of = |cats: &[String]| -> Vec<String> {
        set.matches
            .iter()
            .filter(|m| cats.contains(&m.category))
            .map(|m| m.phrase.clone())
            .collect()
    };
    let subj = phrases_of(subjects);
    let act = phrases_of(actions);
    if subj.is_empty() || act.is_empty() {
        return false;
    }
    match scope {
        Scope::Document => true,
        Scope::Sentence => text
            .sentences
            .iter()
            .any(|s| contains_any(s, &subj) && contains_any(s, &act)),
    }
}
