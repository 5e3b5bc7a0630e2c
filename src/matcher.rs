// src/matcher.rs
//! Matcher: finds lexicon phrases and patterns in an article's normalized text,
//! then drops matches invalidated by a disambiguation exception.
//!
//! Literal phrases use plain substring containment. That is deliberately loose:
//! a short brand name also matches inside longer compounds, which is what the
//! exception list exists to correct.

use serde::Serialize;
use std::collections::HashSet;

use crate::article::NormalizedText;
use crate::lexicon::{Category, Lexicon};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub phrase: String,
    pub category: String,
    pub weight: i32,
}

/// Matches that survived disambiguation, plus the ones that were suppressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSet {
    pub matches: Vec<Match>,
    pub suppressed: Vec<Match>,
}

impl MatchSet {
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Match> + 'a {
        self.matches.iter().filter(move |m| m.category == category)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.in_category(category).next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Run every category against `text`. Output order follows the lexicon, so it is
/// deterministic; each phrase appears at most once per category.
pub fn find_matches(lex: &Lexicon, text: &NormalizedText) -> MatchSet {
    let mut raw = Vec::new();
    for cat in lex.categories() {
        collect_category(cat, &text.full, &mut raw);
    }

    let mut set = MatchSet::default();
    for m in raw {
        if survives_exceptions(lex, &text.full, &m.phrase) {
            set.matches.push(m);
        } else {
            set.suppressed.push(m);
        }
    }
    set
}

fn collect_category(cat: &Category, text: &str, out: &mut Vec<Match>) {
    let mut seen: HashSet<String> = HashSet::new();
    for p in &cat.phrases {
        if text.contains(p.as_str()) && seen.insert(p.clone()) {
            out.push(Match {
                phrase: p.clone(),
                category: cat.name.clone(),
                weight: cat.weight,
            });
        }
    }
    for re in &cat.patterns {
        if let Some(m) = re.find(text) {
            let phrase = m.as_str().to_string();
            if seen.insert(phrase.clone()) {
                out.push(Match {
                    phrase,
                    category: cat.name.clone(),
                    weight: cat.weight,
                });
            }
        }
    }
}

/// A match survives when its phrase still occurs after masking every context
/// phrase registered against it.
fn survives_exceptions(lex: &Lexicon, text: &str, phrase: &str) -> bool {
    let contexts: Vec<&str> = lex
        .exceptions()
        .iter()
        .filter(|e| e.trigger == phrase && text.contains(e.context.as_str()))
        .map(|e| e.context.as_str())
        .collect();
    if contexts.is_empty() {
        return true;
    }
    let mut masked = text.to_string();
    for ctx in contexts {
        masked = masked.replace(ctx, " ");
    }
    masked.contains(phrase)
}

/// True if any of `phrases` occurs in `text`.
pub fn contains_any(text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| text.contains(p.as_str()))
}
