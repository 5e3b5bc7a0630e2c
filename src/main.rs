//! auto-news-classifier: command-line entrypoint.
//! Classifies a single article, evaluates the rule engine or prompt variants
//! against a labeled CSV, or prints dataset statistics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use auto_news_classifier::config::{load_prompts, prompts::DEFAULT_PROMPTS_PATH, LlmConfig};
use auto_news_classifier::dataset::{load_dataset, DEFAULT_DATASET_PATH};
use auto_news_classifier::lexicon::Lexicon;
use auto_news_classifier::report::{
    render_ranking, render_stats, render_summary, write_report, DEFAULT_RESULTS_DIR,
};
use auto_news_classifier::stats::dataset_stats;
use auto_news_classifier::{evaluate, Article, Comparison, LlmClassifier, RuleEngine, ScoringConfig};

#[derive(Debug, Parser)]
#[command(name = "auto-news-classifier", version, about = "Rule-based automotive news classifier and evaluation harness")]
struct Cli {
    /// Lexicon TOML (defaults to LEXICON_PATH or config/lexicon.toml)
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    /// Directory for JSON reports
    #[arg(long, global = true, default_value = DEFAULT_RESULTS_DIR)]
    out: PathBuf,

    /// Debug-level logging for this crate
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify one article and print the explanation
    Classify {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Evaluate the rule engine against a labeled CSV
    Evaluate {
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        data: PathBuf,
        /// Skip writing the JSON report
        #[arg(long)]
        no_report: bool,
    },
    /// Evaluate every prompt variant through the configured model endpoint and rank them
    Prompts {
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        data: PathBuf,
        #[arg(long, default_value = DEFAULT_PROMPTS_PATH)]
        prompts: PathBuf,
        /// LLM config JSON (defaults to LLM_CONFIG_PATH or config/llm.json)
        #[arg(long)]
        llm: Option<PathBuf>,
        /// Only evaluate the first N samples
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print dataset statistics
    Stats {
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        data: PathBuf,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose {
        "auto_news_classifier=debug,rules=debug,llm=debug,warn"
    } else {
        "auto_news_classifier=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

fn load_lexicon(path: Option<&Path>) -> Result<Lexicon> {
    match path {
        Some(p) => Lexicon::from_file(p),
        None => Lexicon::from_default_path(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Command::Classify { title, body } => {
            let engine = RuleEngine::new("rules", load_lexicon(cli.lexicon.as_deref())?);
            let c = engine.classify_article(&Article::new("cli", title, body));
            println!(
                "{}",
                serde_json::to_string_pretty(&c).context("serializing classification")?
            );
        }
        Command::Evaluate { data, no_report } => {
            let engine = RuleEngine::new("rules", load_lexicon(cli.lexicon.as_deref())?);
            let ds = load_dataset(&data)?;
            let report = evaluate(&engine, &ds.samples, &ScoringConfig::default()).await;
            print!("{}", render_summary(&report));
            if !no_report {
                let path = write_report(&cli.out, "rules", &report.name, &report)?;
                println!("report: {}", path.display());
            }
        }
        Command::Prompts {
            data,
            prompts,
            llm,
            limit,
        } => {
            let cfg = match llm {
                Some(p) => LlmConfig::load_from_file(p)?,
                None => LlmConfig::load_default()?,
            };
            let variants = load_prompts(&prompts)?;
            let ds = load_dataset(&data)?;
            let samples = match limit {
                Some(n) => &ds.samples[..n.min(ds.len())],
                None => &ds.samples[..],
            };
            info!(
                provider = %cfg.provider,
                model = %cfg.model,
                variants = variants.len(),
                samples = samples.len(),
                "prompt evaluation"
            );

            let scoring = ScoringConfig::default();
            let mut cmp = Comparison::new(samples.len());
            for v in variants {
                let clf = LlmClassifier::new(v, cfg.clone())?;
                let report = evaluate(&clf, samples, &scoring).await;
                print!("{}", render_summary(&report));
                if report.fallback_count == report.total && report.total > 0 {
                    warn!(variant = %report.name, "every sample fell back; is the endpoint up?");
                }
                write_report(&cli.out, "prompt", &report.name, &report)?;
                cmp.push(report);
            }
            print!("{}", render_ranking(&cmp));
            let summary = serde_json::json!({
                "dataset_size": cmp.dataset_size,
                "reports": &cmp.reports,
                "per_sample": cmp.per_sample(),
            });
            let path = write_report(&cli.out, "comparison", "prompts", &summary)?;
            println!("report: {}", path.display());
        }
        Command::Stats { data, top } => {
            let lex = load_lexicon(cli.lexicon.as_deref())?;
            let ds = load_dataset(&data)?;
            let st = dataset_stats(&ds.samples, &lex, top);
            print!("{}", render_stats(&st));
            if ds.skipped > 0 {
                println!("skipped rows: {}", ds.skipped);
            }
        }
    }
    Ok(())
}
