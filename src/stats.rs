// src/stats.rs
//! Descriptive statistics over a labeled dataset: label balance, text lengths per
//! label, and how often lexicon phrases occur in each class.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::article::{normalize, Label, LabeledArticle};
use crate::lexicon::Lexicon;

#[derive(Debug, Clone, Default, Serialize)]
pub struct LabelStats {
    pub count: usize,
    pub ratio: f64,
    pub mean_title_len: f64,
    pub mean_body_len: f64,
    /// Lexicon phrase → total occurrences, most frequent first.
    pub top_phrases: Vec<(String, usize)>,
    pub example_titles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetStats {
    pub total: usize,
    pub automotive: LabelStats,
    pub non_automotive: LabelStats,
}

pub fn dataset_stats(samples: &[LabeledArticle], lex: &Lexicon, top_n: usize) -> DatasetStats {
    // a phrase listed under several categories is counted once
    let mut seen = HashSet::new();
    let phrases: Vec<String> = lex
        .entries()
        .into_iter()
        .map(|e| e.phrase)
        .filter(|p| seen.insert(p.clone()))
        .collect();
    let total = samples.len();
    let per_label = |label: Label| {
        let subset: Vec<&LabeledArticle> = samples.iter().filter(|s| s.label == label).collect();
        label_stats(&subset, total, &phrases, top_n)
    };
    DatasetStats {
        total,
        automotive: per_label(Label::Automotive),
        non_automotive: per_label(Label::NonAutomotive),
    }
}

fn label_stats(
    subset: &[&LabeledArticle],
    total: usize,
    phrases: &[String],
    top_n: usize,
) -> LabelStats {
    let count = subset.len();
    if count == 0 {
        return LabelStats::default();
    }
    let mean = |f: &dyn Fn(&LabeledArticle) -> usize| {
        subset.iter().map(|s| f(s)).sum::<usize>() as f64 / count as f64
    };

    // BTreeMap keeps ties in a stable order after the count sort.
    let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
    for s in subset {
        let text = normalize(&s.article.full_text());
        for p in phrases {
            let n = text.matches(p.as_str()).count();
            if n > 0 {
                *freq.entry(p.as_str()).or_insert(0) += n;
            }
        }
    }
    let mut top: Vec<(String, usize)> = freq.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    top.sort_by(|a, b| b.1.cmp(&a.1));
    top.truncate(top_n);

    LabelStats {
        count,
        ratio: count as f64 / total as f64,
        mean_title_len: mean(&|s| s.article.title.chars().count()),
        mean_body_len: mean(&|s| s.article.body.chars().count()),
        top_phrases: top,
        example_titles: subset
            .iter()
            .take(3)
            .map(|s| s.article.title.clone())
            .collect(),
    }
}
