//! Debounce for per-frame predictions.
//!
//! A label is committed once it has repeated `threshold` times after the frame that
//! introduced it. The counter then restarts, so holding a sign commits it again every
//! `threshold` frames rather than on every frame.

use crate::signs::Label;

pub const DEFAULT_THRESHOLD: u32 = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecognitionState {
    pub last_label: Option<Label>,
    pub consecutive_count: u32,
}

#[derive(Debug, Clone)]
pub struct StabilityFilter {
    state: RecognitionState,
    threshold: u32,
}

impl StabilityFilter {
    pub fn new(threshold: u32) -> Self {
        Self {
            state: RecognitionState::default(),
            threshold: threshold.max(1),
        }
    }

    /// Feed one prediction, returning the label when it commits.
    ///
    /// `None` is tracked like any other value (it replaces the last label and clears the
    /// count) but never commits.
    pub fn update(&mut self, label: Option<Label>) -> Option<Label> {
        if label == self.state.last_label {
            self.state.consecutive_count = self.state.consecutive_count.saturating_add(1);
        } else {
            self.state.last_label = label;
            self.state.consecutive_count = 0;
        }

        let label = label?;
        if self.state.consecutive_count >= self.threshold {
            self.state.consecutive_count = 0;
            return Some(label);
        }
        None
    }

    pub fn state(&self) -> RecognitionState {
        self.state
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.state = RecognitionState::default();
    }
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(filter: &mut StabilityFilter, label: Option<Label>, frames: usize) -> Vec<Label> {
        (0..frames).filter_map(|_| filter.update(label)).collect()
    }

    #[test]
    fn test_commits_after_threshold_repeats() {
        let mut f = StabilityFilter::default();
        // First frame introduces the label, the next 14 repeats are not enough
        assert!(feed(&mut f, Some(Label::A), 15).is_empty());
        assert_eq!(f.state().consecutive_count, 14);
        assert_eq!(f.update(Some(Label::A)), Some(Label::A));
        assert_eq!(f.state().consecutive_count, 0);
    }

    #[test]
    fn test_held_sign_repeats_every_threshold_frames() {
        let mut f = StabilityFilter::default();
        assert_eq!(feed(&mut f, Some(Label::B), 16), vec![Label::B]);
        assert!(feed(&mut f, Some(Label::B), 14).is_empty());
        assert_eq!(f.update(Some(Label::B)), Some(Label::B));
        assert_eq!(feed(&mut f, Some(Label::B), 30), vec![Label::B, Label::B]);
    }

    #[test]
    fn test_interruption_resets_count() {
        let mut f = StabilityFilter::default();
        assert!(feed(&mut f, Some(Label::V), 10).is_empty());
        assert!(f.update(Some(Label::L)).is_none());
        assert_eq!(
            f.state(),
            RecognitionState {
                last_label: Some(Label::L),
                consecutive_count: 0
            }
        );
        // Back to V: needs a fresh introduction plus 15 repeats
        assert!(feed(&mut f, Some(Label::V), 15).is_empty());
        assert_eq!(f.update(Some(Label::V)), Some(Label::V));
    }

    #[test]
    fn test_none_never_commits() {
        let mut f = StabilityFilter::new(3);
        assert!(feed(&mut f, None, 50).is_empty());
        assert_eq!(f.state().last_label, None);

        assert!(feed(&mut f, Some(Label::A), 3).is_empty());
        assert!(f.update(None).is_none());
        assert_eq!(f.state().consecutive_count, 0);
        assert!(feed(&mut f, Some(Label::A), 3).is_empty());
        assert_eq!(f.update(Some(Label::A)), Some(Label::A));
    }

    #[test]
    fn test_long_none_run_saturates() {
        let mut f = StabilityFilter::new(3);
        f.state = RecognitionState {
            last_label: None,
            consecutive_count: u32::MAX - 1,
        };
        assert!(feed(&mut f, None, 3).is_empty());
        assert_eq!(f.state().consecutive_count, u32::MAX);

        // The next real label starts a fresh run
        assert!(f.update(Some(Label::B)).is_none());
        assert_eq!(f.state().consecutive_count, 0);
    }

    #[test]
    fn test_reset() {
        let mut f = StabilityFilter::new(2);
        feed(&mut f, Some(Label::A), 2);
        f.reset();
        assert_eq!(f.state(), RecognitionState::default());
        assert_eq!(StabilityFilter::new(0).threshold(), 1);
    }
}
