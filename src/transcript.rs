//! Running output of committed letters.

use crate::signs::Label;

/// Shown in place of an empty transcript.
pub const WAITING: &str = "Waiting...";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: Label) {
        self.text.push(label.as_char());
    }

    /// Append a single space. No-op on an empty transcript.
    pub fn add_space(&mut self) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of committed letters, spaces excluded.
    pub fn letter_count(&self) -> usize {
        self.text.chars().filter(|c| *c != ' ').count()
    }

    /// Text for the display surface: the transcript, or [`WAITING`] when empty.
    pub fn display(&self) -> &str {
        if self.text.is_empty() {
            WAITING
        } else {
            &self.text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_display() {
        let mut t = Transcript::new();
        assert_eq!(t.display(), WAITING);
        t.push(Label::A);
        t.push(Label::B);
        assert_eq!(t.display(), "AB");
        assert_eq!(t.letter_count(), 2);
    }

    #[test]
    fn test_space_on_empty_is_noop() {
        let mut t = Transcript::new();
        t.add_space();
        assert!(t.is_empty());
        assert_eq!(t.display(), WAITING);
    }

    #[test]
    fn test_spaces_not_counted() {
        let mut t = Transcript::new();
        for label in [Label::V, Label::A, Label::L] {
            t.push(label);
            t.add_space();
        }
        assert_eq!(t.text(), "V A L ");
        assert_eq!(t.letter_count(), 3);
    }

    #[test]
    fn test_clear_shows_waiting() {
        let mut t = Transcript::new();
        t.push(Label::L);
        t.add_space();
        t.clear();
        assert_eq!(t.display(), WAITING);
        t.clear();
        assert_eq!(t.display(), WAITING);
    }
}
