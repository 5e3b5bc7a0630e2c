// src/dataset.rs
//! Labeled CSV dataset loader.
//!
//! Required columns (case-insensitive): `id`, `title`, `content` or `body`, `label`.
//! A leading UTF-8 BOM is tolerated. Rows with an empty id, an empty label, or a
//! label other than 0/1 are skipped and counted.

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::article::{Article, Label, LabeledArticle};

pub const DEFAULT_DATASET_PATH: &str = "data/samples.csv";

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub samples: Vec<LabeledArticle>,
    /// Rows dropped as invalid.
    pub skipped: usize,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

struct Columns {
    id: usize,
    title: usize,
    body: usize,
    label: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let Some(id) = find(&["id"]) else {
            bail!("dataset is missing required column `id`");
        };
        let Some(title) = find(&["title"]) else {
            bail!("dataset is missing required column `title`");
        };
        let Some(body) = find(&["content", "body"]) else {
            bail!("dataset is missing required column `content` (or `body`)");
        };
        let Some(label) = find(&["label"]) else {
            bail!("dataset is missing required column `label`");
        };
        Ok(Self {
            id,
            title,
            body,
            label,
        })
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset at {}", path.display()))?;
    let ds = parse_dataset(&content)
        .with_context(|| format!("invalid dataset {}", path.display()))?;
    info!(
        path = %path.display(),
        samples = ds.len(),
        skipped = ds.skipped,
        "dataset loaded"
    );
    Ok(ds)
}

pub fn parse_dataset(content: &str) -> Result<Dataset> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().context("reading dataset header")?.clone();
    let cols = Columns::resolve(&headers)?;

    let mut ds = Dataset::default();
    for (row, rec) in rdr.records().enumerate() {
        let rec = match rec {
            Ok(r) => r,
            Err(e) => {
                warn!(row = row + 1, error = %e, "skipping unreadable row");
                ds.skipped += 1;
                continue;
            }
        };
        let cell = |i: usize| rec.get(i).unwrap_or("");
        let id = cell(cols.id).trim();
        let Some(label) = Label::parse(cell(cols.label)) else {
            ds.skipped += 1;
            continue;
        };
        if id.is_empty() {
            ds.skipped += 1;
            continue;
        }
        ds.samples.push(LabeledArticle {
            article: Article::new(id, cell(cols.title), cell(cols.body)),
            label,
        });
    }
    if ds.skipped > 0 {
        warn!(skipped = ds.skipped, "dataset rows skipped as invalid");
    }
    Ok(ds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_and_case_insensitive_headers() {
        let csv = "\u{feff}ID,Title,Content,Label\nA1,현대차 신차,\"본문, 쉼표\",1\nA2,날씨,맑음,0\n";
        let ds = parse_dataset(csv).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.samples[0].article.id, "A1");
        assert_eq!(ds.samples[0].article.body, "본문, 쉼표");
        assert_eq!(ds.samples[1].label, Label::NonAutomotive);
    }

    #[test]
    fn body_column_alias() {
        let ds = parse_dataset("id,title,body,label\n1,t,b,0\n").unwrap();
        assert_eq!(ds.samples[0].article.body, "b");
    }

    #[test]
    fn invalid_rows_are_skipped() {
        let csv = "id,title,content,label\n,no id,x,1\n2,no label,x,\n3,bad label,x,7\n4,ok,x,1\n";
        let ds = parse_dataset(csv).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped, 3);
        assert_eq!(ds.samples[0].article.id, "4");
    }

    #[test]
    fn missing_column_is_named() {
        let err = parse_dataset("id,title,label\n1,t,0\n").unwrap_err().to_string();
        assert!(err.contains("`content`"), "{err}");
    }
}
