//! Model-backed classifier: sends one prompt variant plus the article to an
//! OpenAI-compatible or Ollama endpoint and extracts a 0/1 label from the reply.
//! Failures surface as `ClassifyError`; the harness decides what to do with them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::article::{Article, Label};
use crate::classifier::{Classifier, ClassifyError, Prediction};
use crate::config::{LlmConfig, PromptVariant, ProviderKind};
use crate::engine::anon_hash;

/// Only the head of the reply is searched for a label.
const LABEL_WINDOW: usize = 10;

pub struct LlmClassifier {
    http: reqwest::Client,
    cfg: LlmConfig,
    kind: ProviderKind,
    prompt: PromptVariant,
}

impl LlmClassifier {
    pub fn new(prompt: PromptVariant, cfg: LlmConfig) -> anyhow::Result<Self> {
        let kind = cfg.kind()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("auto-news-classifier/", env!("CARGO_PKG_VERSION")))
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            http,
            cfg,
            kind,
            prompt,
        })
    }

    pub fn prompt(&self) -> &PromptVariant {
        &self.prompt
    }

    async fn call_openai(&self, article: &Article) -> Result<String, ClassifyError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            #[serde(default)]
            content: String,
        }

        let user = user_message(article);
        let req = Req {
            model: &self.cfg.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: &self.prompt.text,
                },
                Msg {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.cfg.temperature,
            max_tokens: self.cfg.max_tokens,
        };

        let mut rb = self
            .http
            .post(format!("{}/chat/completions", self.cfg.base_url))
            .json(&req);
        if !self.cfg.api_key.is_empty() {
            rb = rb.bearer_auth(&self.cfg.api_key);
        }
        let resp = rb.send().await.map_err(|e| self.transport_err(e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClassifyError::Status {
                status: status.as_u16(),
            });
        }
        let body: Resp = resp.json().await.map_err(|e| self.transport_err(e))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClassifyError::Decode("empty choices".into()))
    }

    async fn call_ollama(&self, article: &Article) -> Result<String, ClassifyError> {
        #[derive(Serialize)]
        struct Options {
            temperature: f32,
            num_predict: u32,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            prompt: String,
            stream: bool,
            options: Options,
        }
        #[derive(Deserialize)]
        struct Resp {
            response: String,
        }

        let req = Req {
            model: &self.cfg.model,
            prompt: format!("{}\n\n{}", self.prompt.text, user_message(article)),
            stream: false,
            options: Options {
                temperature: self.cfg.temperature,
                num_predict: self.cfg.max_tokens,
            },
        };
        let resp = self
            .http
            .post(format!("{}/api/generate", self.cfg.base_url))
            .json(&req)
            .send()
            .await
            .map_err(|e| self.transport_err(e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClassifyError::Status {
                status: status.as_u16(),
            });
        }
        let body: Resp = resp.json().await.map_err(|e| self.transport_err(e))?;
        Ok(body.response)
    }

    fn transport_err(&self, e: reqwest::Error) -> ClassifyError {
        if e.is_timeout() {
            ClassifyError::Timeout(self.cfg.timeout())
        } else {
            ClassifyError::from(e)
        }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, article: &Article) -> Result<Prediction, ClassifyError> {
        let raw = match self.kind {
            ProviderKind::Openai => self.call_openai(article).await?,
            ProviderKind::Ollama => self.call_ollama(article).await?,
        };
        let raw = raw.trim().to_string();
        debug!(
            target: "llm",
            id = %anon_hash(&article.full_text()),
            prompt = %self.prompt.name,
            reply = %raw.chars().take(20).collect::<String>(),
            "model replied"
        );
        match parse_label(&raw) {
            Some(label) => Ok(Prediction::from_model(label, raw)),
            None => Err(ClassifyError::Unparseable(raw)),
        }
    }

    fn name(&self) -> &str {
        &self.prompt.name
    }

    fn artifact_len(&self) -> usize {
        self.prompt.len_chars()
    }
}

pub fn user_message(article: &Article) -> String {
    format!("[기사]\n제목: {}\n본문: {}", article.title, article.body)
}

/// First standalone `0` or `1` within the first characters of the trimmed reply.
/// "1", "답: 0", "1." parse; "10", "2024" do not.
pub fn parse_label(reply: &str) -> Option<Label> {
    let chars: Vec<char> = reply.trim().chars().collect();
    for (i, &c) in chars.iter().enumerate().take(LABEL_WINDOW) {
        if c != '0' && c != '1' {
            continue;
        }
        let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
        let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
        if prev_digit || next_digit {
            continue;
        }
        return Some(if c == '1' {
            Label::Automotive
        } else {
            Label::NonAutomotive
        });
    }
    None
}
