// src/classifier.rs
//! Classifier seam shared by the rule engine and the external model client.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::article::{Article, Label};
use crate::decision::{Confidence, Outcome};

/// Per-sample failure. The harness recovers from every variant by substituting
/// the default label, so none of these abort an evaluation run.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("no 0/1 label in response {0:?}")]
    Unparseable(String),
}

impl From<reqwest::Error> for ClassifyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClassifyError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ClassifyError::Status {
                status: status.as_u16(),
            }
        } else {
            ClassifyError::Transport(e.to_string())
        }
    }
}

/// What a classifier returns for one article. Rule-engine predictions carry the
/// explanation; model predictions carry the raw reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl Prediction {
    /// Bare label, no explanation.
    pub fn label_only(label: Label) -> Self {
        Self {
            label,
            score: None,
            outcome: None,
            confidence: None,
            matched: Vec::new(),
            gates: Vec::new(),
            raw_response: None,
        }
    }

    pub fn from_model(label: Label, raw: impl Into<String>) -> Self {
        Self {
            raw_response: Some(raw.into()),
            ..Self::label_only(label)
        }
    }

    /// Default-negative outcome of the rule engine, uncorroborated threshold passes included.
    /// Gate decisions are definitive whatever their score.
    pub fn is_low_confidence(&self) -> bool {
        self.outcome == Some(Outcome::Default)
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, article: &Article) -> Result<Prediction, ClassifyError>;

    /// Variant name used in reports and rankings.
    fn name(&self) -> &str;

    /// Characters in the artifact being scored (prompt text or rule-set source).
    fn artifact_len(&self) -> usize;
}
