// src/harness.rs
//! Evaluation harness: replays a classifier over a labeled dataset, strictly in
//! order, and reduces the results to an `EvaluationReport`.
//!
//! Composite score (competition formula):
//!   length_score = 1                                   if L <= free_len
//!                = sqrt(1 - ((L - free_len) / (max_len - free_len))^2)   otherwise
//!   composite    = 0.9 * accuracy + 0.1 * length_score

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::article::{Label, LabeledArticle};
use crate::classifier::{Classifier, Prediction};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub max_len: usize,
    /// Lengths up to this many characters get a full length score.
    pub free_len: usize,
    pub accuracy_weight: f64,
    pub length_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_len: 3000,
            free_len: 300,
            accuracy_weight: 0.9,
            length_weight: 0.1,
        }
    }
}

pub fn length_score(len: usize, cfg: &ScoringConfig) -> f64 {
    if len <= cfg.free_len {
        return 1.0;
    }
    if cfg.max_len <= cfg.free_len {
        return 0.0;
    }
    let ratio = (len - cfg.free_len) as f64 / (cfg.max_len - cfg.free_len) as f64;
    let inner = 1.0 - ratio * ratio;
    if inner <= 0.0 {
        0.0
    } else {
        inner.sqrt().clamp(0.0, 1.0)
    }
}

pub fn composite_score(accuracy: f64, length_score: f64, cfg: &ScoringConfig) -> f64 {
    cfg.accuracy_weight * accuracy + cfg.length_weight * length_score
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleResult {
    pub id: String,
    pub title: String,
    pub actual: Label,
    pub predicted: Label,
    pub correct: bool,
    /// The classifier failed and the default label was substituted.
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
}

/// One misclassified article, as listed in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Miss {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub name: String,
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    pub accuracy: f64,
    pub artifact_len: usize,
    pub length_score: f64,
    pub composite: f64,
    pub fallback_count: usize,
    pub low_confidence_count: usize,
    pub false_positives: Vec<Miss>,
    pub false_negatives: Vec<Miss>,
    pub results: Vec<SampleResult>,
}

const TITLE_MAX: usize = 50;

/// Classify every sample in order. A failing sample gets `Label::DEFAULT` and is
/// counted in `fallback_count`; it never stops the run.
pub async fn evaluate<C>(
    classifier: &C,
    samples: &[LabeledArticle],
    scoring: &ScoringConfig,
) -> EvaluationReport
where
    C: Classifier + ?Sized,
{
    let name = classifier.name().to_string();
    info!(classifier = %name, samples = samples.len(), "evaluation started");

    let mut results = Vec::with_capacity(samples.len());
    let mut false_positives = Vec::new();
    let mut false_negatives = Vec::new();
    let mut correct = 0usize;
    let mut fallback_count = 0usize;
    let mut low_confidence_count = 0usize;

    for (i, s) in samples.iter().enumerate() {
        counter!("classifier_samples_total", "classifier" => name.clone()).increment(1);

        let (predicted, prediction, error) = match classifier.classify(&s.article).await {
            Ok(p) => (p.label, Some(p), None),
            Err(e) => {
                warn!(classifier = %name, id = %s.article.id, error = %e, "classification failed; using default label");
                counter!("classifier_fallback_total", "classifier" => name.clone()).increment(1);
                fallback_count += 1;
                (Label::DEFAULT, None, Some(e.to_string()))
            }
        };

        if prediction.as_ref().is_some_and(Prediction::is_low_confidence) {
            low_confidence_count += 1;
        }

        let is_correct = predicted == s.label;
        if is_correct {
            correct += 1;
        } else {
            let miss = Miss {
                id: s.article.id.clone(),
                title: s.article.short_title(TITLE_MAX),
                reason: miss_reason(prediction.as_ref(), error.as_deref()),
            };
            match (s.label, predicted) {
                (Label::NonAutomotive, Label::Automotive) => false_positives.push(miss),
                _ => false_negatives.push(miss),
            }
        }

        results.push(SampleResult {
            id: s.article.id.clone(),
            title: s.article.short_title(TITLE_MAX),
            actual: s.label,
            predicted,
            correct: is_correct,
            fallback: error.is_some(),
            error,
            prediction,
        });

        if (i + 1) % 50 == 0 {
            info!(classifier = %name, done = i + 1, total = samples.len(), "progress");
        }
    }

    let total = samples.len();
    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    };
    let artifact_len = classifier.artifact_len();
    let ls = length_score(artifact_len, scoring);
    let report = EvaluationReport {
        name,
        total,
        correct,
        wrong: total - correct,
        accuracy,
        artifact_len,
        length_score: ls,
        composite: composite_score(accuracy, ls, scoring),
        fallback_count,
        low_confidence_count,
        false_positives,
        false_negatives,
        results,
    };
    info!(
        classifier = %report.name,
        accuracy = report.accuracy,
        composite = report.composite,
        fallbacks = report.fallback_count,
        "evaluation finished"
    );
    report
}

fn miss_reason(prediction: Option<&Prediction>, error: Option<&str>) -> Option<String> {
    if let Some(e) = error {
        return Some(format!("fallback: {e}"));
    }
    let p = prediction?;
    if !p.gates.is_empty() {
        return Some(p.gates.join(", "));
    }
    if !p.matched.is_empty() {
        return Some(format!("matched: {}", p.matched.join(", ")));
    }
    p.raw_response.as_ref().map(|r| format!("response: {r}"))
}

/// Composite descending, then shorter artifact, then name.
fn rank_order(a: &EvaluationReport, b: &EvaluationReport) -> Ordering {
    b.composite
        .total_cmp(&a.composite)
        .then_with(|| a.artifact_len.cmp(&b.artifact_len))
        .then_with(|| a.name.cmp(&b.name))
}

pub fn rank(reports: &[EvaluationReport]) -> Vec<&EvaluationReport> {
    let mut v: Vec<&EvaluationReport> = reports.iter().collect();
    v.sort_by(|a, b| rank_order(a, b));
    v
}

pub fn best(reports: &[EvaluationReport]) -> Option<&EvaluationReport> {
    reports.iter().min_by(|a, b| rank_order(a, b))
}

/// Reports of several variants over the same dataset. Only ever appended to.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Comparison {
    pub dataset_size: usize,
    pub reports: Vec<EvaluationReport>,
}

impl Comparison {
    pub fn new(dataset_size: usize) -> Self {
        Self {
            dataset_size,
            reports: Vec::new(),
        }
    }

    pub fn push(&mut self, report: EvaluationReport) {
        self.reports.push(report);
    }

    pub fn ranked(&self) -> Vec<&EvaluationReport> {
        rank(&self.reports)
    }

    pub fn best(&self) -> Option<&EvaluationReport> {
        best(&self.reports)
    }

    /// Cross-variant view of every sample, in dataset order: which variants got
    /// it right and the share of variants that did.
    pub fn per_sample(&self) -> Vec<SampleAgreement> {
        let mut rows: Vec<SampleAgreement> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for report in &self.reports {
            for s in &report.results {
                let i = *index.entry(s.id.as_str()).or_insert_with(|| {
                    rows.push(SampleAgreement::new(s));
                    rows.len() - 1
                });
                let row = &mut rows[i];
                if s.correct {
                    row.correct.push(report.name.clone());
                } else {
                    row.wrong.push(report.name.clone());
                }
            }
        }
        let variants = self.reports.len();
        for row in &mut rows {
            row.all_correct = row.wrong.is_empty();
            row.all_wrong = row.correct.is_empty();
            row.success_rate = if variants == 0 {
                0.0
            } else {
                row.correct.len() as f64 / variants as f64
            };
        }
        rows
    }
}

/// How every compared variant fared on one sample.
#[derive(Debug, Clone, Serialize)]
pub struct SampleAgreement {
    pub id: String,
    pub title: String,
    pub actual: Label,
    pub correct: Vec<String>,
    pub wrong: Vec<String>,
    pub all_correct: bool,
    pub all_wrong: bool,
    pub success_rate: f64,
}

impl SampleAgreement {
    fn new(s: &SampleResult) -> Self {
        Self {
            id: s.id.clone(),
            title: s.title.clone(),
            actual: s.actual,
            correct: Vec::new(),
            wrong: Vec::new(),
            all_correct: false,
            all_wrong: false,
            success_rate: 0.0,
        }
    }
}
