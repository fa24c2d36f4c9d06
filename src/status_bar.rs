//! One-line status bar: source, game and speech state at a glance

use unicode_width::UnicodeWidthStr;

use crate::game::GamePhase;
use crate::signs::Label;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SourceStatus {
    /// Interactive session without a frame source
    Offline,
    Tracking,
    Ended,
    Failed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatusDisplayStyle {
    /// Use emojis and symbols
    Emoji,
    /// Use text labels
    Text,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub source: SourceStatus,
    pub spin_frame: usize,
    /// Latest raw prediction of the first hand
    pub prediction: Option<Label>,
    pub hands: usize,
    pub phase: GamePhase,
    pub target: Option<Label>,
    pub score: u32,
    pub speech_rate: f32,
    pub letters: usize,
}

impl Default for StatusBarState {
    fn default() -> Self {
        Self {
            source: SourceStatus::Offline,
            spin_frame: 0,
            prediction: None,
            hands: 0,
            phase: GamePhase::Inactive,
            target: None,
            score: 0,
            speech_rate: 1.0,
            letters: 0,
        }
    }
}

impl StatusBarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_spinner(&mut self) {
        self.spin_frame = self.spin_frame.wrapping_add(1);
    }

    pub fn spinner_string(&self) -> String {
        match self.source {
            SourceStatus::Tracking => {
                let frame = self.spin_frame % SPINNER.len();
                format!("\x1b[93m{}\x1b[90m ", SPINNER[frame])
            }
            _ => String::new(),
        }
    }

    pub fn source_string(&self, style: StatusDisplayStyle) -> String {
        match (style, self.source) {
            (StatusDisplayStyle::Emoji, SourceStatus::Offline) => "💤".into(),
            (StatusDisplayStyle::Emoji, SourceStatus::Tracking) => {
                format!("✋ {}", self.hands)
            }
            (StatusDisplayStyle::Emoji, SourceStatus::Ended) => "⏹".into(),
            (StatusDisplayStyle::Emoji, SourceStatus::Failed) => "⚠️".into(),
            (StatusDisplayStyle::Text, SourceStatus::Offline) => "\x1b[33m[NO SOURCE]\x1b[0m".into(),
            (StatusDisplayStyle::Text, SourceStatus::Tracking) => {
                format!("\x1b[32m[HANDS {}]\x1b[0m", self.hands)
            }
            (StatusDisplayStyle::Text, SourceStatus::Ended) => "\x1b[90m[ENDED]\x1b[0m".into(),
            (StatusDisplayStyle::Text, SourceStatus::Failed) => "\x1b[31m[SOURCE ERROR]\x1b[0m".into(),
        }
    }

    pub fn prediction_string(&self) -> String {
        match self.prediction {
            Some(label) => format!("{} {}", label.glyph(), label),
            None => "-".into(),
        }
    }

    /// Game summary with color coding
    pub fn game_string(&self) -> String {
        let target = self
            .target
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".into());
        match self.phase {
            GamePhase::Inactive => format!("\x1b[90m🎮 off ({})\x1b[90m", self.score),
            GamePhase::Awaiting => format!("\x1b[96m🎯 {} │ ⭐ {}\x1b[90m", target, self.score),
            GamePhase::Celebrating => format!("\x1b[92m🎉 {} │ ⭐ {}\x1b[90m", target, self.score),
        }
    }

    pub fn render_status(&self, style: StatusDisplayStyle, term_width: Option<usize>) -> String {
        let status_content = match style {
            StatusDisplayStyle::Emoji => format!(
                "{}{} │ 👁 {} │ {} │ 🔊 {:.2}x │ 📝 {}",
                self.spinner_string(),
                self.source_string(style),
                self.prediction_string(),
                self.game_string(),
                self.speech_rate,
                self.letters
            ),
            StatusDisplayStyle::Text => format!(
                " {} | Sign: {} | Game: {} target={} score={} | Rate: {:.2} | Letters: {}",
                self.source_string(style),
                self.prediction.map(|l| l.to_string()).unwrap_or_else(|| "-".into()),
                self.phase,
                self.target.map(|l| l.to_string()).unwrap_or_else(|| "-".into()),
                self.score,
                self.speech_rate,
                self.letters
            ),
        };

        if let (Some(width), StatusDisplayStyle::Emoji) = (term_width, style) {
            let status_width = status_content.width();
            let padding = if width > status_width {
                (width - status_width) / 2
            } else {
                0
            };
            format!("\x1b[90m{}{}\x1b[0m", " ".repeat(padding), status_content)
        } else {
            status_content
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_status() {
        let state = StatusBarState {
            source: SourceStatus::Tracking,
            hands: 1,
            prediction: Some(Label::V),
            phase: GamePhase::Awaiting,
            target: Some(Label::B),
            score: 3,
            letters: 7,
            ..StatusBarState::default()
        };
        let line = state.render_status(StatusDisplayStyle::Text, None);
        assert!(line.contains("[HANDS 1]"));
        assert!(line.contains("Sign: V"));
        assert!(line.contains("Game: Awaiting target=B score=3"));
        assert!(line.contains("Letters: 7"));
    }

    #[test]
    fn test_spinner_only_while_tracking() {
        let mut state = StatusBarState::new();
        assert!(state.spinner_string().is_empty());
        state.source = SourceStatus::Tracking;
        let first = state.spinner_string();
        state.update_spinner();
        assert_ne!(first, state.spinner_string());
    }

    #[test]
    fn test_emoji_status_centered() {
        let state = StatusBarState::new();
        let narrow = state.render_status(StatusDisplayStyle::Emoji, Some(10));
        let wide = state.render_status(StatusDisplayStyle::Emoji, Some(200));
        assert!(wide.len() > narrow.len());
        assert!(narrow.starts_with("\x1b[90m💤"));
    }
}
