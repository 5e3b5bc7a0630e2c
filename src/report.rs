// src/report.rs
//! Report output: timestamped JSON files under the results directory and a
//! plain-text console summary.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::harness::{Comparison, EvaluationReport, Miss};
use crate::stats::{DatasetStats, LabelStats};

pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Misses shown per list in the console summary.
const SUMMARY_MISSES: usize = 10;

/// Keep names filesystem-safe: alphanumerics (any script), `-` and `_`.
fn file_safe(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if s.is_empty() {
        "unnamed".into()
    } else {
        s
    }
}

pub fn report_file_name(kind: &str, name: &str, stamp: &str) -> String {
    format!("{}_{}_{}.json", file_safe(kind), file_safe(name), stamp)
}

/// Write `value` as pretty JSON to `{dir}/{kind}_{name}_{YYYYmmdd_HHMMSS}.json`.
pub fn write_report<T: Serialize>(dir: &Path, kind: &str, name: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create results dir {}", dir.display()))?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let path = dir.join(report_file_name(kind, name, &stamp));
    let json = serde_json::to_string_pretty(value).context("serializing report")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

fn push_misses(out: &mut String, heading: &str, misses: &[Miss]) {
    let _ = writeln!(out, "{heading} ({}):", misses.len());
    for m in misses.iter().take(SUMMARY_MISSES) {
        match &m.reason {
            Some(r) => {
                let _ = writeln!(out, "  - [{}] {}  <{}>", m.id, m.title, r);
            }
            None => {
                let _ = writeln!(out, "  - [{}] {}", m.id, m.title);
            }
        }
    }
    if misses.len() > SUMMARY_MISSES {
        let _ = writeln!(out, "  ... {} more", misses.len() - SUMMARY_MISSES);
    }
}

pub fn render_summary(r: &EvaluationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", r.name);
    let _ = writeln!(
        out,
        "accuracy   {:.2}% ({}/{})",
        r.accuracy * 100.0,
        r.correct,
        r.total
    );
    let _ = writeln!(out, "length     {} chars (score {:.4})", r.artifact_len, r.length_score);
    let _ = writeln!(out, "composite  {:.4}", r.composite);
    let _ = writeln!(out, "fallbacks  {}", r.fallback_count);
    if r.low_confidence_count > 0 {
        let _ = writeln!(out, "low-conf   {}", r.low_confidence_count);
    }
    push_misses(&mut out, "false positives", &r.false_positives);
    push_misses(&mut out, "false negatives", &r.false_negatives);
    out
}

pub fn render_ranking(cmp: &Comparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ranking over {} samples:", cmp.dataset_size);
    for (i, r) in cmp.ranked().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {:<20} composite {:.4}  acc {:.2}%  len {}  fallbacks {}",
            i + 1,
            r.name,
            r.composite,
            r.accuracy * 100.0,
            r.artifact_len,
            r.fallback_count
        );
    }
    if let Some(b) = cmp.best() {
        let _ = writeln!(out, "best: {}", b.name);
    }
    if cmp.reports.len() > 1 {
        let rows = cmp.per_sample();
        let all_wrong: Vec<_> = rows.iter().filter(|r| r.all_wrong).collect();
        let all_correct = rows.iter().filter(|r| r.all_correct).count();
        let _ = writeln!(
            out,
            "every variant right: {all_correct}  every variant wrong: {}",
            all_wrong.len()
        );
        for r in all_wrong.iter().take(SUMMARY_MISSES) {
            let _ = writeln!(out, "  [{}] label {} {}", r.id, r.actual.as_u8(), r.title);
        }
    }
    out
}

fn push_label_stats(out: &mut String, heading: &str, s: &LabelStats) {
    let _ = writeln!(out, "{heading}: {} ({:.1}%)", s.count, s.ratio * 100.0);
    let _ = writeln!(
        out,
        "  mean title {:.1} chars, mean body {:.1} chars",
        s.mean_title_len, s.mean_body_len
    );
    if !s.top_phrases.is_empty() {
        let top: Vec<String> = s
            .top_phrases
            .iter()
            .map(|(p, n)| format!("{p}({n})"))
            .collect();
        let _ = writeln!(out, "  top phrases: {}", top.join(", "));
    }
    for t in &s.example_titles {
        let _ = writeln!(out, "  e.g. {t}");
    }
}

pub fn render_stats(st: &DatasetStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "samples: {}", st.total);
    push_label_stats(&mut out, "automotive (1)", &st.automotive);
    push_label_stats(&mut out, "non-automotive (0)", &st.non_automotive);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_misses(n: usize) -> EvaluationReport {
        let miss = |i: usize| Miss {
            id: format!("fp{i}"),
            title: "제목".into(),
            reason: None,
        };
        EvaluationReport {
            name: "rules".into(),
            total: 20,
            correct: 20 - n,
            wrong: n,
            accuracy: (20 - n) as f64 / 20.0,
            artifact_len: 120,
            length_score: 1.0,
            composite: 0.9,
            fallback_count: 0,
            low_confidence_count: 0,
            false_positives: (0..n).map(miss).collect(),
            false_negatives: Vec::new(),
            results: Vec::new(),
        }
    }

    #[test]
    fn file_name_shape() {
        assert_eq!(
            report_file_name("prompt", "v1 short/개선", "20250101_120000"),
            "prompt_v1_short_개선_20250101_120000.json"
        );
        assert_eq!(report_file_name("rules", "", "x"), "rules_unnamed_x.json");
    }

    #[test]
    fn summary_lists_first_ten_misses() {
        let s = render_summary(&report_with_misses(12));
        assert!(s.contains("false positives (12):"));
        assert!(s.contains("[fp9]"));
        assert!(!s.contains("[fp10]"));
        assert!(s.contains("... 2 more"));
    }

    #[test]
    fn write_report_creates_timestamped_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), "rules", "base", &report_with_misses(1)).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("rules_base_") && name.ends_with(".json"), "{name}");
        let v: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["name"], "rules");
        assert_eq!(v["false_positives"][0]["id"], "fp0");
    }
}
