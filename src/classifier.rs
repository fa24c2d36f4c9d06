//! Rule-based sign classifier.
//!
//! A finger counts as extended when its tip sits strictly above its PIP joint
//! (smaller `y` is higher on screen). Rules are checked in a fixed order and the
//! first match wins:
//!
//! | Fingers up (index, middle, ring, pinky) | Thumb | Label |
//! |---|---|---|
//! | none | any | `A` |
//! | all four | any | `B` |
//! | index only | abducted | `L` |
//! | index + middle | any | `V` |

use crate::landmark::{Hand, Handedness, idx};
use crate::signs::Label;

pub trait SignClassifier: Send {
    /// Predict a label for one hand, or `None` when no rule matches.
    fn classify(&self, hand: &Hand) -> Option<Label>;
}

/// Extension flags of the four tracked fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerState {
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub fn of(hand: &Hand) -> Self {
        let up = |tip: usize, pip: usize| hand.point(tip).y < hand.point(pip).y;
        Self {
            index: up(idx::INDEX_TIP, idx::INDEX_PIP),
            middle: up(idx::MIDDLE_TIP, idx::MIDDLE_PIP),
            ring: up(idx::RING_TIP, idx::RING_PIP),
            pinky: up(idx::PINKY_TIP, idx::PINKY_PIP),
        }
    }

    fn as_array(self) -> [bool; 4] {
        [self.index, self.middle, self.ring, self.pinky]
    }
}

/// Thumb tip held out past the thumb MCP, on the outer side for the given hand.
pub fn thumb_abducted(hand: &Hand) -> bool {
    let tip = hand.point(idx::THUMB_TIP).x;
    let base = hand.point(idx::THUMB_MCP).x;
    match hand.handedness {
        Handedness::Left => tip > base,
        Handedness::Right => tip < base,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

impl SignClassifier for HeuristicClassifier {
    fn classify(&self, hand: &Hand) -> Option<Label> {
        let fingers = FingerState::of(hand);

        match fingers.as_array() {
            [false, false, false, false] => Some(Label::A),
            [true, true, true, true] => Some(Label::B),
            [true, false, false, false] if thumb_abducted(hand) => Some(Label::L),
            [true, true, false, false] => Some(Label::V),
            _ => None,
        }
    }
}
