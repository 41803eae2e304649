//! Content-addressed cache of synthesized speech.
//!
//! Artifacts live at `<cache_dir>/<sha256(text)>.wav`, are written once and
//! never evicted.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::tts::SpeechSynthesizer;

const AUDIO_EXTENSION: &str = "wav";

/// File name for the artifact of `text`: hex SHA-256 digest plus extension.
pub fn cache_key(text: &str) -> String {
    format!("{}.{AUDIO_EXTENSION}", hex::encode(Sha256::digest(text.as_bytes())))
}

pub struct AudioCache {
    dir: PathBuf,
    synth: Box<dyn SpeechSynthesizer>,
}

impl AudioCache {
    /// Open the cache, creating `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>, synth: Box<dyn SpeechSynthesizer>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Config(format!("cannot create cache dir {}: {e}", dir.display()))
        })?;
        Ok(Self { dir, synth })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, text: &str) -> PathBuf {
        self.dir.join(cache_key(text))
    }

    /// Return the artifact path for `text`, synthesizing it on a miss.
    pub async fn ensure_audio(&self, text: &str) -> Result<PathBuf> {
        let path = self.path_for(text);
        if path.exists() {
            debug!("Cache hit: {}", path.display());
            return Ok(path);
        }

        info!("Cache miss, synthesizing: {text}");
        let audio = self.synth.synthesize(text).await?;

        // Whole-file replace so a concurrent run never sees a partial artifact.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&audio)?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;

        debug!("Cached {} bytes at {}", audio.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSynth {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SpeechSynthesizer for CountingSynth {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("RIFF:{text}").into_bytes())
        }
    }

    struct FailingSynth;

    #[async_trait]
    impl SpeechSynthesizer for FailingSynth {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
            Err(Error::Synthesis("503 Service Unavailable".into()))
        }
    }

    fn counting_cache(dir: &Path) -> (AudioCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let synth = CountingSynth { calls: calls.clone() };
        (AudioCache::new(dir, Box::new(synth)).unwrap(), calls)
    }

    #[test]
    fn key_is_sha256_hex_plus_extension() {
        let key = cache_key("der Hund.");
        assert_eq!(key.len(), 64 + ".wav".len());
        assert!(key.ends_with(".wav"));
        assert!(key[..64].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            cache_key(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855.wav"
        );
    }

    #[test]
    fn key_is_deterministic_and_byte_sensitive() {
        assert_eq!(cache_key("die Katze."), cache_key("die Katze."));
        assert_ne!(cache_key("die Katze."), cache_key("die Katze"));
        assert_ne!(cache_key("Die Katze."), cache_key("die Katze."));
    }

    #[tokio::test]
    async fn miss_writes_artifact_then_hit_skips_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let (cache, calls) = counting_cache(dir.path());

        let first = cache.ensure_audio("der Hund.").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read(&first).unwrap(), b"RIFF:der Hund.");

        let second = cache.ensure_audio("der Hund.").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn artifacts_survive_a_new_cache_instance() {
        let dir = tempfile::tempdir().unwrap();
        let (cache, _) = counting_cache(dir.path());
        let path = cache.ensure_audio("das Pferd.").await.unwrap();
        drop(cache);

        let (reopened, calls) = counting_cache(dir.path());
        assert_eq!(reopened.ensure_audio("das Pferd.").await.unwrap(), path);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("ai-audio").join("de");
        let (cache, _) = counting_cache(&nested);
        assert!(nested.is_dir());
        let path = cache.ensure_audio("ein Ball").await.unwrap();
        assert_eq!(path.parent().unwrap(), nested);
    }

    #[tokio::test]
    async fn synthesis_failure_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::new(dir.path(), Box::new(FailingSynth)).unwrap();

        let err = cache.ensure_audio("der Fisch.").await.unwrap_err();
        assert!(matches!(err, Error::Synthesis(_)));
        assert!(!cache.path_for("der Fisch.").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
