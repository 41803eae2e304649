//! Configuration management for echotype.
//!
//! Loads config from YAML files in standard locations. Every section has
//! defaults, so a partial file or no file at all is valid.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    pub model: String,
    pub temperature: f32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub model: String,
    pub voice: String,
    pub instructions: String,
    pub speed: f32,
    pub response_format: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini-tts".into(),
            voice: "shimmer".into(),
            instructions: "Spreche mit deutlicher lustiger Stimme. Sprache ist Deutsch.".into(),
            speed: 0.75,
            response_format: "wav".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub cue_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub correct_cue: String,
    /// Played after a wrong answer. Defaults to the "correct" cue.
    pub incorrect_cue: String,
    pub win_cue: String,
    pub warmup: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            cue_dir: PathBuf::from("audio"),
            cache_dir: PathBuf::from("ai-audio"),
            correct_cue: "correct.wav".into(),
            incorrect_cue: "correct.wav".into(),
            win_cue: "win.wav".into(),
            warmup: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub backend: String,
    pub command: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            backend: "aplay".into(),
            command: "aplay".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub pass_ratio: f64,
    pub topics: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pass_ratio: 0.7,
            topics: default_topics(),
        }
    }
}

fn default_topics() -> Vec<String> {
    [
        "Haustiere",
        "Frühstück",
        "Reisen",
        "Berufe",
        "Farben",
        "Gefühle",
        "Familie",
        "Sportarten",
        "Zufälliges Thema",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub challenges: ChallengeConfig,
    pub tts: TtsConfig,
    pub audio: AudioConfig,
    pub player: PlayerConfig,
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/echotype/config.yaml
    /// 3. /etc/echotype/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/echotype/config.yaml")),
                Some(PathBuf::from("/etc/echotype/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::from_yaml(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    /// Parse a YAML document. An empty topic list is replaced by the defaults.
    pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yml::Error> {
        let mut config: Self = serde_yml::from_str(contents)?;
        if config.session.topics.is_empty() {
            config.session.topics = default_topics();
        }
        Ok(config)
    }

    /// Apply `OPENAI_API_KEY` from the environment over the file value.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.openai.api_key = key.trim().to_string();
            }
        }
        self
    }

    /// The API key, or a configuration error if none was supplied.
    pub fn api_key(&self) -> Result<&str> {
        if self.openai.api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key missing (set OPENAI_API_KEY or openai.api_key)".into(),
            ));
        }
        Ok(&self.openai.api_key)
    }

    pub fn cue_dir(&self) -> PathBuf {
        resolve(&self.audio.cue_dir)
    }

    pub fn cache_dir(&self) -> PathBuf {
        resolve(&self.audio.cache_dir)
    }
}

/// Relative paths are taken from the working directory.
fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}
