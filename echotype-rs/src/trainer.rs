//! Session loop with state machine.
//!
//! TOPIC SELECTION → CHALLENGE FETCH → PRESENTING(i) → AWAITING INPUT(i)
//! → SCORING(i) → PRESENTING(i+1) | FINISHED

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::AudioCache;
use crate::challenges::{ChallengeSource, MAX_CHALLENGES};
use crate::config::Config;
use crate::error::Result;
use crate::player::{warmup_silence, Player, WARMUP_FORMAT};
use crate::prompt::{Prompter, Replay};
use crate::session::{select_topic, Session, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TopicSelection,
    ChallengeFetch,
    Presenting(usize),
    AwaitingInput(usize),
    Scoring(usize),
    Finished,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopicSelection => write!(f, "TOPIC_SELECTION"),
            Self::ChallengeFetch => write!(f, "CHALLENGE_FETCH"),
            Self::Presenting(i) => write!(f, "PRESENTING({i})"),
            Self::AwaitingInput(i) => write!(f, "AWAITING_INPUT({i})"),
            Self::Scoring(i) => write!(f, "SCORING({i})"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}

/// Cue sounds and loop settings taken from the config.
#[derive(Debug, Clone)]
pub struct TrainerSettings {
    pub topics: Vec<String>,
    pub pass_ratio: f64,
    pub warmup: bool,
    pub correct_cue: PathBuf,
    pub incorrect_cue: PathBuf,
    pub win_cue: PathBuf,
}

impl TrainerSettings {
    pub fn from_config(config: &Config) -> Self {
        let cue_dir = config.cue_dir();
        Self {
            topics: config.session.topics.clone(),
            pass_ratio: config.session.pass_ratio,
            warmup: config.audio.warmup,
            correct_cue: cue_dir.join(&config.audio.correct_cue),
            incorrect_cue: cue_dir.join(&config.audio.incorrect_cue),
            win_cue: cue_dir.join(&config.audio.win_cue),
        }
    }
}

/// Final outcome of a practice run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub topic: String,
    pub score: usize,
    pub total: usize,
    pub won: bool,
}

/// Drives one practice run against its collaborators.
///
/// Player and prompter calls block; the run is strictly sequential, so
/// nothing else is waiting on the runtime while they do.
pub struct Trainer {
    settings: TrainerSettings,
    phase: Phase,
    source: Box<dyn ChallengeSource>,
    cache: AudioCache,
    player: Arc<dyn Player>,
    prompter: Box<dyn Prompter>,
    replay: Replay,
}

impl Trainer {
    /// `replay` must be the handle the prompter's key binding was built with.
    pub fn new(
        settings: TrainerSettings,
        source: Box<dyn ChallengeSource>,
        cache: AudioCache,
        player: Arc<dyn Player>,
        prompter: Box<dyn Prompter>,
        replay: Replay,
    ) -> Self {
        Self {
            settings,
            phase: Phase::TopicSelection,
            source,
            cache,
            player,
            prompter,
            replay,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub async fn run(&mut self, out: &mut dyn Write) -> Result<SessionReport> {
        self.phase = Phase::TopicSelection;
        let topic = self.choose_topic(out)?;

        self.transition(Phase::ChallengeFetch);
        writeln!(out, "\n📚 Thema gewählt: {topic}")?;
        writeln!(out, "⏳ Fordere Aufgaben von der KI an...\n")?;
        let mut challenges = self.source.fetch(&topic, MAX_CHALLENGES).await?;
        challenges.truncate(MAX_CHALLENGES);
        info!("Received {} challenges for '{topic}'", challenges.len());

        let mut session = Session::new(topic, challenges);
        if session.total() > 0 {
            self.practice(&mut session, out).await?;
        } else {
            warn!("No challenges received");
        }

        self.transition(Phase::Finished);
        self.finish(&session, out)
    }

    fn choose_topic(&mut self, out: &mut dyn Write) -> Result<String> {
        writeln!(out, "🧠 Wähle ein Thema:")?;
        for (i, topic) in self.settings.topics.iter().enumerate() {
            writeln!(out, "{}. {topic}", i + 1)?;
        }
        out.flush()?;

        let input = self.prompter.read_line("Nummer eingeben: ")?;
        let choice = select_topic(&input, &self.settings.topics);
        if choice.fallback {
            warn!("Invalid topic selection {input:?}, using '{}'", choice.topic);
            writeln!(out, "Ungültige Auswahl. Standard: '{}'", choice.topic)?;
        }
        Ok(choice.topic)
    }

    async fn practice(&mut self, session: &mut Session, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "🎯 Wiederhole, was du hörst. Drücke [Tab], um es erneut zu hören.\n")?;
        out.flush()?;
        if self.settings.warmup {
            self.player.play_pcm(&warmup_silence(), WARMUP_FORMAT)?;
        }

        while let Some(challenge) = session.current().map(str::to_string) {
            let i = session.position();

            self.transition(Phase::Presenting(i));
            writeln!(out, "🔊 Aufgabe {i} von {}:", session.total())?;
            out.flush()?;
            let audio = self.cache.ensure_audio(&challenge).await?;
            self.player.play_file(&audio)?;

            self.transition(Phase::AwaitingInput(i));
            self.replay.arm(&audio);
            let answer = self.prompter.read_line("Deine Eingabe: ");
            self.replay.disarm();
            let answer = answer?;

            self.transition(Phase::Scoring(i));
            match session.answer(&answer) {
                Some(Verdict::Correct { exact }) => {
                    writeln!(out, "✅ Richtig!\n")?;
                    if !exact {
                        writeln!(out, "💡 Exakte Schreibweise: {challenge}\n")?;
                    }
                    out.flush()?;
                    self.player.play_file(&self.settings.correct_cue)?;
                }
                Some(Verdict::Incorrect) => {
                    writeln!(out, "❌ Falsch. Korrekt wäre gewesen: '{challenge}'\n")?;
                    out.flush()?;
                    self.player.play_file(&self.settings.incorrect_cue)?;
                }
                None => break,
            }
            debug!("Score {}/{}", session.score(), session.total());
        }
        Ok(())
    }

    fn finish(&self, session: &Session, out: &mut dyn Write) -> Result<SessionReport> {
        writeln!(
            out,
            "🏁 Spiel beendet. Deine Punktzahl: {} von {}",
            session.score(),
            session.total()
        )?;
        out.flush()?;

        let won = session.passed(self.settings.pass_ratio);
        if won {
            self.player.play_file(&self.settings.win_cue)?;
        }

        Ok(SessionReport {
            topic: session.topic().to_string(),
            score: session.score(),
            total: session.total(),
            won,
        })
    }

    fn transition(&mut self, next: Phase) {
        debug!("State: {} → {next}", self.phase);
        self.phase = next;
    }
}
