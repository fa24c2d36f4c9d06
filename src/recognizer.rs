//! Per-frame recognition: classify every hand, then debounce through one shared filter.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::classifier::{HeuristicClassifier, SignClassifier};
use crate::landmark::Hand;
use crate::signs::Label;
use crate::stability::StabilityFilter;

/// What happened in one processed frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Hands in detection order
    pub hands: Vec<Hand>,
    /// Raw prediction for each hand
    pub predictions: Vec<Option<Label>>,
    /// Labels committed by the filter during this frame
    pub commits: Vec<Label>,
    pub elapsed: Duration,
}

/// Classifier plus stability filter.
///
/// All hands of a frame go through the same filter in detection order, so two hands
/// showing different signs keep resetting each other's count.
pub struct Recognizer {
    classifier: Box<dyn SignClassifier>,
    filter: StabilityFilter,
}

impl Recognizer {
    pub fn new(threshold: u32) -> Self {
        Self::with_classifier(Box::new(HeuristicClassifier), threshold)
    }

    pub fn with_classifier(classifier: Box<dyn SignClassifier>, threshold: u32) -> Self {
        Self {
            classifier,
            filter: StabilityFilter::new(threshold),
        }
    }

    #[hotpath::measure]
    pub fn process_frame(&mut self, hands: Vec<Hand>) -> FrameReport {
        let start = Instant::now();
        let mut predictions = Vec::with_capacity(hands.len());
        let mut commits = Vec::new();

        for hand in &hands {
            let predicted = self.classifier.classify(hand);
            predictions.push(predicted);
            if let Some(label) = self.filter.update(predicted) {
                debug!(%label, "committed");
                commits.push(label);
            }
        }

        FrameReport {
            hands,
            predictions,
            commits,
            elapsed: start.elapsed(),
        }
    }

    pub fn filter(&self) -> &StabilityFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::fixtures::hand;
    use crate::landmark::Handedness;

    fn fist() -> Hand {
        hand([false; 4], Handedness::Right, false)
    }

    fn palm() -> Hand {
        hand([true; 4], Handedness::Left, false)
    }

    #[test]
    fn test_single_hand_commits() {
        let mut r = Recognizer::new(15);
        let commits: Vec<Label> = (0..16)
            .flat_map(|_| r.process_frame(vec![fist()]).commits)
            .collect();
        assert_eq!(commits, vec![Label::A]);
    }

    #[test]
    fn test_empty_frame_is_untouched() {
        let mut r = Recognizer::new(2);
        r.process_frame(vec![fist()]);
        r.process_frame(vec![fist()]);
        let report = r.process_frame(vec![]);
        assert!(report.predictions.is_empty());
        // No hands means the classifier and filter are not consulted
        assert_eq!(r.filter().state().consecutive_count, 1);
        assert_eq!(r.process_frame(vec![fist()]).commits, vec![Label::A]);
    }

    #[test]
    fn test_two_hands_share_one_filter() {
        let mut r = Recognizer::new(3);
        for _ in 0..20 {
            let report = r.process_frame(vec![fist(), palm()]);
            assert_eq!(report.predictions, vec![Some(Label::A), Some(Label::B)]);
            assert!(report.commits.is_empty());
        }
    }

    #[test]
    fn test_two_hands_same_sign_count_twice() {
        let mut r = Recognizer::new(3);
        // Frame 1: intro + one repeat, frame 2: two more repeats reach the threshold
        assert!(r.process_frame(vec![fist(), fist()]).commits.is_empty());
        assert_eq!(r.process_frame(vec![fist(), fist()]).commits, vec![Label::A]);
    }
}
