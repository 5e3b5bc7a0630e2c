// tests/config_files.rs
// The shipped config files load and the bundled lexicon behaves on typical headlines.

use std::path::PathBuf;

use auto_news_classifier::config::{load_prompts, LlmConfig, ProviderKind};
use auto_news_classifier::decision::Outcome;
use auto_news_classifier::{Article, Label, Lexicon, RuleEngine};

fn repo_path(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
}

fn bundled() -> RuleEngine {
    RuleEngine::new(
        "bundled",
        Lexicon::from_file(&repo_path("config/lexicon.toml")).expect("bundled lexicon"),
    )
}

fn classify(title: &str, body: &str) -> (Label, Outcome) {
    let d = bundled()
        .classify_article(&Article::new("t", title, body))
        .decision;
    (d.label, d.outcome)
}

#[test]
fn bundled_lexicon_loads() {
    let lex = Lexicon::from_file(&repo_path("config/lexicon.toml")).unwrap();
    assert_eq!(lex.policy.threshold, 3);
    assert!(lex.lookup("maker").unwrap().contains(&"현대차".to_string()));
    assert!(lex.cooccurrence().is_some());
    assert!(!lex.ambiguous().is_empty());
    assert!(lex.source_len() > 0);
}

#[test]
fn bundled_lexicon_typical_headlines() {
    assert_eq!(
        classify("현대차, 신형 전기차 출시", "현대차가 내년 전기차를 양산한다."),
        (Label::Automotive, Outcome::Threshold)
    );
    assert_eq!(
        classify("현대차, UAM 기체 개발 착수", ""),
        (Label::NonAutomotive, Outcome::ExclusionGate)
    );
    assert_eq!(
        classify("ESS용 배터리 대규모 수주", ""),
        (Label::NonAutomotive, Outcome::ExclusionGate)
    );
    assert_eq!(
        classify("오늘 전국 날씨 맑음", ""),
        (Label::NonAutomotive, Outcome::Default)
    );
    assert_eq!(
        classify("기아대학교 입학식 개최", ""),
        (Label::NonAutomotive, Outcome::Default)
    );
}

#[test]
fn bundled_prompts_load() {
    let ps = load_prompts(&repo_path("config/prompts.toml")).unwrap();
    assert!(ps.len() >= 2);
    assert!(ps.iter().all(|p| !p.text.is_empty()));
}

#[serial_test::serial]
#[test]
fn bundled_llm_config_loads() {
    let cfg = LlmConfig::load_from_file(repo_path("config/llm.json")).unwrap();
    assert_eq!(cfg.kind().unwrap(), ProviderKind::Openai);
    assert!((10..=60).contains(&cfg.timeout_secs));
}

#[test]
fn bundled_ess_match_is_token_bounded() {
    assert_eq!(
        classify(
            "현대차, 신형 전기차 출시",
            "출처: Business Korea. 현대차가 전기차를 양산한다."
        ),
        (Label::Automotive, Outcome::Threshold)
    );
    assert_eq!(
        classify("ESS 사업 확대 발표", ""),
        (Label::NonAutomotive, Outcome::ExclusionGate)
    );
}

#[test]
fn bundled_vehicle_qualifier_is_an_inclusion_gate() {
    assert_eq!(
        classify("차량용 반도체 공급 확대", ""),
        (Label::Automotive, Outcome::InclusionGate)
    );
}
