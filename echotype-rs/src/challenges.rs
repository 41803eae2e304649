//! Practice phrases from an OpenAI chat model.
//!
//! Asks for a numbered list of short German words or sentences on a topic
//! and turns the reply into a list of challenges.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::config::{ChallengeConfig, OpenAiConfig};
use crate::error::{Error, Result};

/// Number of challenges requested per session.
pub const MAX_CHALLENGES: usize = 10;

const PROMPT_TEMPLATE: &str = r#"Du bist ein Sprachtrainer für die 2. Klasse Grundschule.
Gib mir {count} kurze, einzelne Wörter oder vollständige Sätze in neuer deutscher Rechtschreibung zum Üben,
thematisch passend zum Thema "{topic}". Bei einzelnen Substantiven füge stets einen bestimmten/unbestimmten Artikel kleingeschrieben hinzu.
Beende vollständige Sätze stets mit einem Punkt.
Liefere nur die Begriffe oder Sätze, keine Erklärungen. Antworte als Liste im Format:
1. ...
2. ...
usw."#;

static ENUMERATION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid enumeration regex"));

/// Supplies the ordered practice phrases for a topic.
#[async_trait]
pub trait ChallengeSource: Send + Sync {
    async fn fetch(&self, topic: &str, limit: usize) -> Result<Vec<String>>;
}

pub struct OpenAiChallengeSource {
    config: ChallengeConfig,
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiChallengeSource {
    pub fn new(openai: &OpenAiConfig, config: ChallengeConfig) -> Result<Self> {
        if openai.api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for challenges".into()));
        }

        Ok(Self {
            config,
            base_url: openai.base_url.trim_end_matches('/').to_string(),
            api_key: openai.api_key.clone(),
            client: Client::builder().build()?,
        })
    }
}

#[async_trait]
impl ChallengeSource for OpenAiChallengeSource {
    async fn fetch(&self, topic: &str, limit: usize) -> Result<Vec<String>> {
        let prompt = PROMPT_TEMPLATE
            .replace("{count}", &limit.to_string())
            .replace("{topic}", topic);

        debug!("Requesting {limit} challenges for '{topic}' from {}", self.config.model);

        let body = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.config.temperature,
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::ChallengeSource(format!("{status}: {text}")));
        }

        let data: serde_json::Value = resp.json().await?;
        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::ChallengeSource("reply has no message content".into()))?;

        debug!("Model reply: {content}");
        Ok(parse_challenge_list(content, limit))
    }
}

/// Split a numbered list reply into challenges.
///
/// Blank lines are dropped. The `N.` prefix is stripped when present; lines
/// without one are kept as they are after trimming.
pub fn parse_challenge_list(raw: &str, limit: usize) -> Vec<String> {
    raw.trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| ENUMERATION_PREFIX.replace(line, "").trim().to_string())
        .take(limit)
        .collect()
}
