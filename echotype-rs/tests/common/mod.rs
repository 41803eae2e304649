//! Shared fakes for driving the session loop without network, audio or a
//! terminal.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use echotype::cache::AudioCache;
use echotype::challenges::ChallengeSource;
use echotype::player::{PcmFormat, Player};
use echotype::prompt::{Prompter, Replay};
use echotype::trainer::{Trainer, TrainerSettings};
use echotype::tts::SpeechSynthesizer;
use echotype::{Error, Result};

/// Returns a fixed list and remembers what it was asked for.
pub struct FixedSource {
    pub challenges: Vec<String>,
    pub requests: Arc<Mutex<Vec<(String, usize)>>>,
}

#[async_trait]
impl ChallengeSource for FixedSource {
    async fn fetch(&self, topic: &str, limit: usize) -> Result<Vec<String>> {
        self.requests.lock().unwrap().push((topic.to_string(), limit));
        Ok(self.challenges.clone())
    }
}

pub struct FailingSource;

#[async_trait]
impl ChallengeSource for FailingSource {
    async fn fetch(&self, _topic: &str, _limit: usize) -> Result<Vec<String>> {
        Err(Error::ChallengeSource("401 Unauthorized".into()))
    }
}

/// Counts synthesis calls; the "audio" is the text itself.
pub struct CountingSynth {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SpeechSynthesizer for CountingSynth {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.as_bytes().to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Played {
    File(PathBuf),
    Pcm(usize, PcmFormat),
}

#[derive(Default)]
pub struct RecordingPlayer {
    pub played: Mutex<Vec<Played>>,
}

impl RecordingPlayer {
    pub fn log(&self) -> Vec<Played> {
        self.played.lock().unwrap().clone()
    }

    pub fn count_file(&self, path: &Path) -> usize {
        self.log()
            .iter()
            .filter(|p| matches!(p, Played::File(f) if f == path))
            .count()
    }
}

impl Player for RecordingPlayer {
    fn play_file(&self, path: &Path) -> Result<()> {
        self.played.lock().unwrap().push(Played::File(path.to_path_buf()));
        Ok(())
    }

    fn play_pcm(&self, pcm: &[u8], format: PcmFormat) -> Result<()> {
        self.played.lock().unwrap().push(Played::Pcm(pcm.len(), format));
        Ok(())
    }
}

/// One scripted prompt response.
pub enum Step {
    Line(&'static str),
    /// Press the replay key this many times, then enter the line.
    ReplayThen(usize, &'static str),
    Interrupt,
}

/// Replays a script of answers, recording every prompt shown.
pub struct ScriptedPrompter {
    pub steps: VecDeque<Step>,
    pub replay: Replay,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.steps.pop_front() {
            Some(Step::Line(line)) => Ok(line.to_string()),
            Some(Step::ReplayThen(times, line)) => {
                for _ in 0..times {
                    assert!(self.replay.trigger()?, "replay pressed with nothing armed");
                }
                Ok(line.to_string())
            }
            Some(Step::Interrupt) | None => Err(Error::Interrupted),
        }
    }
}

/// Everything a test needs to inspect after a run.
pub struct Harness {
    pub trainer: Trainer,
    pub player: Arc<RecordingPlayer>,
    pub synth_calls: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<(String, usize)>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub cache_dir: tempfile::TempDir,
    pub settings: TrainerSettings,
}

pub fn settings(cue_dir: &Path) -> TrainerSettings {
    TrainerSettings {
        topics: vec!["Haustiere".into(), "Frühstück".into(), "Reisen".into()],
        pass_ratio: 0.7,
        warmup: true,
        correct_cue: cue_dir.join("correct.wav"),
        incorrect_cue: cue_dir.join("correct.wav"),
        win_cue: cue_dir.join("win.wav"),
    }
}

pub fn harness(challenges: &[&str], steps: Vec<Step>) -> Harness {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let source = FixedSource {
        challenges: challenges.iter().map(|s| s.to_string()).collect(),
        requests: requests.clone(),
    };
    harness_with_source(Box::new(source), requests, steps)
}

pub fn harness_with_source(
    source: Box<dyn ChallengeSource>,
    requests: Arc<Mutex<Vec<(String, usize)>>>,
    steps: Vec<Step>,
) -> Harness {
    let cache_dir = tempfile::tempdir().unwrap();
    let synth_calls = Arc::new(AtomicUsize::new(0));
    let cache = AudioCache::new(
        cache_dir.path(),
        Box::new(CountingSynth {
            calls: synth_calls.clone(),
        }),
    )
    .unwrap();

    let player = Arc::new(RecordingPlayer::default());
    let replay = Replay::new(player.clone());
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let prompter = ScriptedPrompter {
        steps: steps.into(),
        replay: replay.clone(),
        prompts: prompts.clone(),
    };

    let settings = settings(Path::new("/cues"));
    let trainer = Trainer::new(
        settings.clone(),
        source,
        cache,
        player.clone(),
        Box::new(prompter),
        replay,
    );

    Harness {
        trainer,
        player,
        synth_calls,
        requests,
        prompts,
        cache_dir,
        settings,
    }
}
