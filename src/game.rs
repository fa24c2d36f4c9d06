//! Practice game: sign the target letter to score, then wait for the next round.
//!
//! ```text
//!             start                commit == target            round elapsed
//! Inactive ──────────▶ Awaiting ─────────────────────▶ Celebrating ───────────▶ Awaiting
//!     ▲                    │                                │
//!     └──── stop ──────────┴────────────────────────────────┘
//! ```
//!
//! The state machine does not own a timer. A match returns the round id; the caller
//! schedules `on_round_elapsed(round)` after the celebration delay. Timers that outlive a
//! restart carry an old round id and are ignored.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;

use crate::signs::{Label, RECOGNIZABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Inactive,
    Awaiting,
    Celebrating,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Inactive => write!(f, "Inactive"),
            GamePhase::Awaiting => write!(f, "Awaiting"),
            GamePhase::Celebrating => write!(f, "Celebrating"),
        }
    }
}

pub struct GameSession<R: Rng = StdRng> {
    phase: GamePhase,
    target: Option<Label>,
    score: u32,
    round: u64,
    labels: Vec<Label>,
    rng: R,
}

impl<R: Rng> GameSession<R> {
    /// A session drawing targets from `labels`; an empty set falls back to the
    /// classifier's labels.
    pub fn new(labels: &[Label], rng: R) -> Self {
        let labels = if labels.is_empty() {
            RECOGNIZABLE.to_vec()
        } else {
            labels.to_vec()
        };
        Self {
            phase: GamePhase::Inactive,
            target: None,
            score: 0,
            round: 0,
            labels,
            rng,
        }
    }

    /// Reset the score and pick a first target. Valid from any phase.
    pub fn start(&mut self) -> Label {
        self.score = 0;
        self.round += 1;
        self.phase = GamePhase::Awaiting;
        self.pick_target()
    }

    /// Returns the round id to schedule when `label` matches the current target.
    pub fn on_commit(&mut self, label: Label) -> Option<u64> {
        if self.phase != GamePhase::Awaiting || self.target != Some(label) {
            return None;
        }
        self.score += 1;
        self.phase = GamePhase::Celebrating;
        Some(self.round)
    }

    /// The celebration delay for `round` is over; returns the next target.
    pub fn on_round_elapsed(&mut self, round: u64) -> Option<Label> {
        if self.phase != GamePhase::Celebrating || round != self.round {
            return None;
        }
        self.round += 1;
        self.phase = GamePhase::Awaiting;
        Some(self.pick_target())
    }

    /// End the session. The last score stays readable.
    pub fn stop(&mut self) {
        self.phase = GamePhase::Inactive;
        self.target = None;
        self.round += 1;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != GamePhase::Inactive
    }

    pub fn target(&self) -> Option<Label> {
        self.target
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    fn pick_target(&mut self) -> Label {
        let label = self.labels[self.rng.gen_range(0..self.labels.len())];
        self.target = Some(label);
        label
    }
}
