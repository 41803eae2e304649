//! Audio playback for cached speech, cue sounds and the warm-up burst.
//!
//! Two backends: `aplay` as a subprocess (default) and rodio in-process.
//! Both block until playback has finished.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::error::{Error, Result};

/// Raw signed 16-bit little-endian PCM layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

pub const WARMUP_FORMAT: PcmFormat = PcmFormat {
    sample_rate: 44100,
    channels: 1,
};

/// Half a second of silence in `WARMUP_FORMAT`.
///
/// Playing this first wakes the output device so the first real utterance
/// is not clipped.
pub fn warmup_silence() -> Vec<u8> {
    let bytes_per_frame = 2 * WARMUP_FORMAT.channels as usize;
    vec![0u8; WARMUP_FORMAT.sample_rate as usize * bytes_per_frame / 2]
}

pub trait Player: Send + Sync {
    fn play_file(&self, path: &Path) -> Result<()>;
    fn play_pcm(&self, pcm: &[u8], format: PcmFormat) -> Result<()>;
}

/// Pick the backend named in the config. Unknown names fall back to aplay.
pub fn create_player(config: &PlayerConfig) -> Arc<dyn Player> {
    let player: Arc<dyn Player> = match config.backend.as_str() {
        "rodio" => Arc::new(RodioPlayer),
        "aplay" => Arc::new(AplayPlayer::new(&config.command)),
        other => {
            warn!("Unknown player backend '{other}', using aplay");
            Arc::new(AplayPlayer::new(&config.command))
        }
    };
    info!("Audio player initialized (backend: {})", config.backend);
    player
}

/// Plays through an external `aplay`-compatible command.
pub struct AplayPlayer {
    command: String,
}

impl AplayPlayer {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }

    fn raw_args(format: PcmFormat) -> Vec<String> {
        vec![
            "-q".into(),
            "-t".into(),
            "raw".into(),
            "-r".into(),
            format.sample_rate.to_string(),
            "-f".into(),
            "S16_LE".into(),
            "-c".into(),
            format.channels.to_string(),
        ]
    }
}

impl Player for AplayPlayer {
    fn play_file(&self, path: &Path) -> Result<()> {
        debug!("{} --quiet {}", self.command, path.display());
        let status = Command::new(&self.command)
            .arg("--quiet")
            .arg(path)
            .status()
            .map_err(|e| Error::Playback(format!("failed to run {}: {e}", self.command)))?;

        if !status.success() {
            return Err(Error::Playback(format!(
                "{} exited with {status} for {}",
                self.command,
                path.display()
            )));
        }
        Ok(())
    }

    fn play_pcm(&self, pcm: &[u8], format: PcmFormat) -> Result<()> {
        let mut child = Command::new(&self.command)
            .args(Self::raw_args(format))
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Playback(format!("failed to spawn {}: {e}", self.command)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(pcm)
                .map_err(|e| Error::Playback(format!("failed to write to {}: {e}", self.command)))?;
        }
        let status = child
            .wait()
            .map_err(|e| Error::Playback(format!("{} failed: {e}", self.command)))?;

        if !status.success() {
            return Err(Error::Playback(format!("{} exited with {status}", self.command)));
        }
        Ok(())
    }
}

/// Plays on the default output device through rodio.
///
/// The output stream is opened per call so the player stays `Send + Sync`.
pub struct RodioPlayer;

impl RodioPlayer {
    fn play_source<S>(source: S) -> Result<()>
    where
        S: rodio::Source + Send + 'static,
    {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| Error::Playback(format!("failed to open audio output: {e}")))?;
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

impl Player for RodioPlayer {
    fn play_file(&self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .map_err(|e| Error::Playback(format!("cannot open {}: {e}", path.display())))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| Error::Playback(format!("cannot decode {}: {e}", path.display())))?;
        Self::play_source(source)
    }

    fn play_pcm(&self, pcm: &[u8], format: PcmFormat) -> Result<()> {
        Self::play_source(SamplesBuffer::new(
            format.channels,
            format.sample_rate,
            s16le_to_f32(pcm),
        ))
    }
}

fn s16le_to_f32(pcm: &[u8]) -> Vec<f32> {
    pcm.chunks_exact(2)
        .map(|b| f32::from(i16::from_le_bytes([b[0], b[1]])) / 32768.0)
        .collect()
}
