//! Line input with a key binding that re-plays the current challenge.
//!
//! The session loop arms a shared [`Replay`] handle with the artifact path
//! before each answer prompt; Tab plays whatever is armed.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rustyline::error::ReadlineError;
use rustyline::{
    Cmd, ConditionalEventHandler, DefaultEditor, Event, EventContext, EventHandler, KeyCode,
    KeyEvent, Modifiers, RepeatCount,
};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::player::Player;

/// Reads one line of user input.
pub trait Prompter {
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Shared "current audio" state between the session loop and the
/// replay key binding.
#[derive(Clone)]
pub struct Replay {
    current: Arc<Mutex<Option<PathBuf>>>,
    player: Arc<dyn Player>,
}

impl Replay {
    pub fn new(player: Arc<dyn Player>) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            player,
        }
    }

    pub fn arm(&self, path: &Path) {
        *self.lock() = Some(path.to_path_buf());
    }

    pub fn disarm(&self) {
        *self.lock() = None;
    }

    pub fn current(&self) -> Option<PathBuf> {
        self.lock().clone()
    }

    /// Play the armed artifact. Returns `Ok(false)` when nothing is armed.
    pub fn trigger(&self) -> Result<bool> {
        let Some(path) = self.current() else {
            return Ok(false);
        };
        debug!("Replaying {}", path.display());
        self.player.play_file(&path)?;
        Ok(true)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PathBuf>> {
        // A poisoned slot only means a replay panicked; the path is still valid.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct ReplayKey {
    replay: Replay,
}

impl ConditionalEventHandler for ReplayKey {
    fn handle(&self, _evt: &Event, _n: RepeatCount, _positive: bool, _ctx: &EventContext) -> Option<Cmd> {
        match self.replay.trigger() {
            Ok(true) => Some(Cmd::Noop),
            // Nothing armed: let Tab do what it normally does.
            Ok(false) => None,
            Err(e) => {
                warn!("Replay failed: {e}");
                Some(Cmd::Noop)
            }
        }
    }
}

/// Interactive prompter backed by rustyline, with Tab bound to replay.
pub struct LinePrompter {
    editor: DefaultEditor,
}

impl LinePrompter {
    pub fn new(replay: Replay) -> Result<Self> {
        let mut editor =
            DefaultEditor::new().map_err(|e| Error::Input(format!("cannot open terminal: {e}")))?;
        editor.bind_sequence(
            KeyEvent(KeyCode::Tab, Modifiers::NONE),
            EventHandler::Conditional(Box::new(ReplayKey { replay })),
        );
        Ok(Self { editor })
    }
}

impl Prompter for LinePrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Err(Error::Interrupted),
            Err(e) => Err(Error::Input(e.to_string())),
        }
    }
}
