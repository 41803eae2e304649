//! Error types for echotype.

use thiserror::Error;

/// Result type alias for echotype operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing API key, bad paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// The language model did not produce a usable challenge list.
    #[error("challenge source error: {0}")]
    ChallengeSource(String),

    /// Text-to-speech request failed.
    #[error("speech synthesis error: {0}")]
    Synthesis(String),

    /// Audio playback failed.
    #[error("playback error: {0}")]
    Playback(String),

    /// Line editor failure other than an interrupt.
    #[error("input error: {0}")]
    Input(String),

    /// User pressed Ctrl-C or Ctrl-D at a prompt.
    #[error("interrupted")]
    Interrupted,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
