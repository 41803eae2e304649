//! Speech synthesis through the OpenAI audio API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::{OpenAiConfig, TtsConfig};
use crate::error::{Error, Result};

/// Converts text into encoded audio bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    instructions: &'a str,
    speed: f32,
    response_format: &'a str,
}

/// OpenAI `/audio/speech` client with fixed voice and style.
pub struct OpenAiSpeech {
    config: TtsConfig,
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiSpeech {
    pub fn new(openai: &OpenAiConfig, config: TtsConfig) -> Result<Self> {
        if openai.api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".into()));
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
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.config.model,
            input: text,
            voice: &self.config.voice,
            instructions: &self.config.instructions,
            speed: self.config.speed,
            response_format: &self.config.response_format,
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        debug!("Synthesized {} bytes for {} chars", audio.len(), text.chars().count());
        Ok(audio.to_vec())
    }
}
