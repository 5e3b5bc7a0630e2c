// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod article;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod decision;
pub mod engine;
pub mod harness;
pub mod lexicon;
pub mod llm_adapter;
pub mod matcher;
pub mod report;
pub mod scorer;
pub mod stats;

// ---- Re-exports for stable public API ----
pub use article::{Article, Label, LabeledArticle};
pub use classifier::{Classifier, ClassifyError, Prediction};
pub use decision::{Confidence, Decision, Outcome};
pub use engine::{Classification, RuleEngine};
pub use harness::{evaluate, Comparison, EvaluationReport, ScoringConfig};
pub use lexicon::Lexicon;
pub use llm_adapter::LlmClassifier;
