use std::io::Write;

use crate::signs::{Label, SPACE_CAPTION, SPACE_GLYPH};
use crate::status_bar::{StatusBarState, StatusDisplayStyle};
use crate::transcript::WAITING;

#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    /// New transcript text; empty shows the waiting sentinel
    Transcript(String),
    Status(StatusBarState),
    /// A sign glyph, from playback or `/show`
    Glyph { label: Label, glyph: &'static str },
    PlaybackSpace,
    PlaybackDone,
    Target(Label),
    Celebrate { score: u32 },
    GameOver { score: u32 },
    Skeleton(Vec<String>),
    Message(String),
    Error(String),
    Tick,
}

#[derive(Clone)]
pub struct Ui {
    tx: flume::Sender<UiEvent>,
}

impl Ui {
    pub fn new() -> (Self, flume::Receiver<UiEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }

    pub fn show_error(&self, text: &str) {
        self.send(UiEvent::Error(text.to_string()));
    }

    pub fn tick(&self) {
        self.send(UiEvent::Tick);
    }
}

/// Draws UI events on a terminal: scrolling lines above, one status line at the bottom.
pub struct Renderer<W: Write = std::io::Stdout> {
    out: W,
    status: StatusBarState,
    style: StatusDisplayStyle,
    term_width: Option<usize>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout(), StatusDisplayStyle::Emoji)
    }
}

impl<W: Write> Renderer<W> {
    pub fn with_writer(out: W, style: StatusDisplayStyle) -> Self {
        Self {
            out,
            status: StatusBarState::new(),
            style,
            term_width: None,
        }
    }

    pub fn set_term_width(&mut self, width: usize) {
        self.term_width = Some(width);
    }

    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Transcript(text) => {
                let shown = if text.is_empty() { WAITING } else { text.as_str() };
                self.line(&format!("\x1b[1m📝 {}\x1b[0m", shown));
            }
            UiEvent::Status(status) => {
                // The spinner is animated by ticks here, not by the sender
                let spin_frame = self.status.spin_frame;
                self.status = status;
                self.status.spin_frame = spin_frame;
            }
            UiEvent::Glyph { label, glyph } => {
                self.line(&format!("\x1b[96m{}  {}\x1b[0m", glyph, label));
            }
            UiEvent::PlaybackSpace => {
                self.line(&format!("\x1b[90m{}  {}\x1b[0m", SPACE_GLYPH, SPACE_CAPTION));
            }
            UiEvent::PlaybackDone => {
                self.line("\x1b[90m✔ Done\x1b[0m");
            }
            UiEvent::Target(label) => {
                self.line(&format!("\x1b[93m🎯 Sign this: {}\x1b[0m", label));
            }
            UiEvent::Celebrate { score } => {
                self.line(&format!("\x1b[92m🎉 Correct! Score: {}\x1b[0m", score));
            }
            UiEvent::GameOver { score } => {
                self.line(&format!("\x1b[95m🏁 Game over. Final score: {}\x1b[0m", score));
            }
            UiEvent::Skeleton(rows) => {
                for row in rows {
                    self.line(&format!("\x1b[90m{}\x1b[0m", row));
                }
            }
            UiEvent::Message(text) => {
                for row in text.lines() {
                    self.line(row);
                }
            }
            UiEvent::Error(text) => {
                self.line(&format!("\x1b[31m{}\x1b[0m", text));
            }
            UiEvent::Tick => {
                self.status.update_spinner();
            }
        }
        self.draw_status();
        self.out.flush().ok();
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let _ = write!(self.out, "\r\x1b[K{}\n", text);
    }

    fn draw_status(&mut self) {
        let status = self.status.render_status(self.style, self.term_width);
        let _ = write!(self.out, "\r\x1b[K{}", status);
    }
}
