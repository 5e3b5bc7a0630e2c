// src/article.rs
//! Article model and text normalization shared by the matcher and the scorer.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentence boundaries: ASCII terminators, the ideographic full stop, and line breaks.
static SENTENCE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?。\r\n]+").expect("sentence split regex"));

/// Binary label. `0` = not automotive, `1` = automotive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    NonAutomotive,
    Automotive,
}

impl Label {
    /// Default-negative label used for ambiguity and fallbacks.
    pub const DEFAULT: Label = Label::NonAutomotive;

    pub fn as_u8(self) -> u8 {
        match self {
            Label::NonAutomotive => 0,
            Label::Automotive => 1,
        }
    }

    /// Parse a dataset cell (`"0"` / `"1"`, surrounding whitespace allowed).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "0" => Some(Label::NonAutomotive),
            "1" => Some(Label::Automotive),
            _ => None,
        }
    }
}

impl From<Label> for u8 {
    fn from(l: Label) -> u8 {
        l.as_u8()
    }
}

impl TryFrom<u8> for Label {
    type Error = String;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Label::NonAutomotive),
            1 => Ok(Label::Automotive),
            other => Err(format!("label must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One news item. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl Article {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    /// Raw `title + " " + body`, as the classifiers see it.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }

    /// Title cut to `max` characters, for reports.
    pub fn short_title(&self, max: usize) -> String {
        if self.title.chars().count() <= max {
            return self.title.clone();
        }
        let mut s: String = self.title.chars().take(max).collect();
        s.push_str("...");
        s
    }
}

/// An article paired with its ground-truth label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledArticle {
    pub article: Article,
    pub label: Label,
}

/// Lower-cased, whitespace-collapsed view of an article, plus its sentences.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub full: String,
    pub sentences: Vec<String>,
}

impl NormalizedText {
    pub fn from_article(article: &Article) -> Self {
        Self::from_parts(&article.title, &article.body)
    }

    pub fn from_parts(title: &str, body: &str) -> Self {
        let full = normalize(&format!("{title} {body}"));
        // The title is its own sentence even without a terminator.
        let sentences = split_sentences(title)
            .into_iter()
            .chain(split_sentences(body))
            .collect();
        Self { full, sentences }
    }
}

/// Lowercase (Unicode-aware) and collapse whitespace runs into single spaces.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            last_space = false;
        }
    }
    out.trim().to_string()
}

fn split_sentences(input: &str) -> Vec<String> {
    SENTENCE_SPLIT
        .split(input)
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_collapses() {
        assert_eq!(normalize("  Hyundai\t\tLAUNCHES\nSUV "), "hyundai launches suv");
        assert_eq!(normalize("현대차  EV"), "현대차 ev");
    }

    #[test]
    fn title_is_its_own_sentence() {
        let n = NormalizedText::from_parts("현대차 신차 출시", "배터리 공장. ESS 수주!");
        assert_eq!(n.sentences, vec!["현대차 신차 출시", "배터리 공장", "ess 수주"]);
        assert_eq!(n.full, "현대차 신차 출시 배터리 공장. ess 수주!");
    }

    #[test]
    fn label_parse_and_serde() {
        assert_eq!(Label::parse(" 1 "), Some(Label::Automotive));
        assert_eq!(Label::parse("2"), None);
        let v = serde_json::to_value(Label::Automotive).unwrap();
        assert_eq!(v, serde_json::json!(1));
    }

    #[test]
    fn short_title_counts_chars_not_bytes() {
        let a = Article::new("1", "자동차산업 동향", "");
        assert_eq!(a.short_title(3), "자동차...");
        assert_eq!(a.short_title(50), "자동차산업 동향");
    }
}
