//! One topic's practice run: challenges, score, and answer judging.

use crate::normalize::equivalent;

/// Outcome of comparing an answer with its challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Equivalent after normalization. `exact` is false when the raw
    /// answer differs from the challenge text, e.g. in case or punctuation.
    Correct { exact: bool },
    Incorrect,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct { .. })
    }
}

pub fn judge(answer: &str, challenge: &str) -> Verdict {
    if equivalent(answer, challenge) {
        Verdict::Correct {
            exact: answer == challenge,
        }
    } else {
        Verdict::Incorrect
    }
}

/// Result of choosing from the topic menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicChoice {
    pub topic: String,
    /// True when the input was unusable and the first topic was substituted.
    pub fallback: bool,
}

/// Map a 1-based menu entry to a topic. Non-numeric or out-of-range input
/// selects the first topic.
///
/// `topics` must not be empty.
pub fn select_topic(input: &str, topics: &[String]) -> TopicChoice {
    let picked = input
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| topics.get(i));

    match picked {
        Some(topic) => TopicChoice {
            topic: topic.clone(),
            fallback: false,
        },
        None => TopicChoice {
            topic: topics[0].clone(),
            fallback: true,
        },
    }
}

/// Ordered challenges for one topic plus the running score.
#[derive(Debug, Clone)]
pub struct Session {
    topic: String,
    challenges: Vec<String>,
    index: usize,
    score: usize,
}

impl Session {
    pub fn new(topic: impl Into<String>, challenges: Vec<String>) -> Self {
        Self {
            topic: topic.into(),
            challenges,
            index: 0,
            score: 0,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn total(&self) -> usize {
        self.challenges.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// 1-based position of the active challenge.
    pub fn position(&self) -> usize {
        self.index + 1
    }

    pub fn current(&self) -> Option<&str> {
        self.challenges.get(self.index).map(String::as_str)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.challenges.len()
    }

    /// Judge `answer` against the active challenge and move to the next one.
    /// Returns `None` once every challenge has been answered.
    pub fn answer(&mut self, answer: &str) -> Option<Verdict> {
        let verdict = judge(answer, self.current()?);
        if verdict.is_correct() {
            self.score += 1;
        }
        self.index += 1;
        Some(verdict)
    }

    /// `score / total >= pass_ratio`. An empty session never passes.
    pub fn passed(&self, pass_ratio: f64) -> bool {
        let total = self.total();
        // Compare the ratio, not `total * pass_ratio`: 10.0 * 0.7 rounds above 7.
        total > 0 && self.score as f64 / total as f64 >= pass_ratio
    }
}
