//! echotype: spoken-spelling trainer for German.
//!
//! Fetches practice phrases from a language model, speaks them through a
//! cached text-to-speech pipeline and scores what the user types back.

pub mod cache;
pub mod challenges;
pub mod config;
pub mod error;
pub mod normalize;
pub mod player;
pub mod prompt;
pub mod session;
pub mod trainer;
pub mod tts;

pub use error::{Error, Result};
