//! Text-to-sign playback: typed text replayed as glyphs, one character per tick.

use std::time::Duration;

use crate::signs::{GlyphAtlas, Label};

pub const DEFAULT_TICK: Duration = Duration::from_millis(800);

/// What a tick shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStep {
    Glyph { label: Label, glyph: &'static str },
    Space,
    /// End of the sequence; the trigger can be used again.
    Done,
}

/// Uppercase `text` and keep only `A`-`Z` and spaces.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_uppercase() || *c == ' ')
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSequence {
    chars: Vec<char>,
    cursor: usize,
}

impl PlaybackSequence {
    /// `None` when nothing is left after normalization.
    pub fn new(text: &str) -> Option<Self> {
        let chars: Vec<char> = normalize(text).chars().collect();
        if chars.is_empty() {
            return None;
        }
        Some(Self { chars, cursor: 0 })
    }

    /// Move to the next displayable character. Letters missing from the atlas are
    /// passed over within the same call.
    pub fn advance(&mut self, atlas: &GlyphAtlas) -> PlaybackStep {
        while let Some(&c) = self.chars.get(self.cursor) {
            self.cursor += 1;
            if c == ' ' {
                return PlaybackStep::Space;
            }
            if let Some(label) = Label::new(c)
                && let Some(glyph) = atlas.glyph(label)
            {
                return PlaybackStep::Glyph { label, glyph };
            }
        }
        PlaybackStep::Done
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// At most one running sequence. Every start gets a new generation; ticks carrying an
/// older generation belong to a cancelled run and do nothing.
#[derive(Debug, Default)]
pub struct Playback {
    current: Option<PlaybackSequence>,
    generation: u64,
    atlas: GlyphAtlas,
}

impl Playback {
    pub fn new(atlas: GlyphAtlas) -> Self {
        Self {
            current: None,
            generation: 0,
            atlas,
        }
    }

    /// Start playing `text`, replacing any running sequence. Returns the generation to
    /// tick, or `None` if the text has nothing playable (the running sequence is kept).
    pub fn start(&mut self, text: &str) -> Option<u64> {
        let sequence = PlaybackSequence::new(text)?;
        self.generation += 1;
        self.current = Some(sequence);
        Some(self.generation)
    }

    pub fn tick(&mut self, generation: u64) -> Option<PlaybackStep> {
        if generation != self.generation {
            return None;
        }
        let step = self.current.as_mut()?.advance(&self.atlas);
        if step == PlaybackStep::Done {
            self.current = None;
        }
        Some(step)
    }

    pub fn cancel(&mut self) {
        self.current = None;
        self.generation += 1;
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }
}
