//! Hand landmarks as delivered by the external tracker.
//!
//! One frame is a JSON object on a single line:
//!
//! ```text
//! {"hands":[{"handedness":"Left","score":0.93,"landmarks":[{"x":0.41,"y":0.62,"z":-0.01}, ...]}]}
//! ```
//!
//! Every hand carries exactly [`LANDMARK_COUNT`] points in image-normalized coordinates
//! (0.0-1.0, `y` grows downward).

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const LANDMARK_COUNT: usize = 21;

/// Accepted `x`/`y` span. Trackers report points slightly off-frame, never far beyond.
pub const COORD_RANGE: std::ops::RangeInclusive<f32> = -1.0..=2.0;

/// Landmark indices (MediaPipe hand model convention)
#[allow(dead_code)]
pub mod idx {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// One detected hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HandJson")]
pub struct Hand {
    pub landmarks: [Landmark; LANDMARK_COUNT],
    pub handedness: Handedness,
    /// Detection confidence reported by the tracker
    pub score: f32,
}

impl Hand {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT], handedness: Handedness) -> Self {
        Self {
            landmarks,
            handedness,
            score: 1.0,
        }
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }
}

#[derive(Deserialize)]
struct HandJson {
    handedness: Handedness,
    #[serde(default = "default_score")]
    score: f32,
    landmarks: Vec<Landmark>,
}

fn default_score() -> f32 {
    1.0
}

impl TryFrom<HandJson> for Hand {
    type Error = String;

    fn try_from(json: HandJson) -> std::result::Result<Self, Self::Error> {
        let count = json.landmarks.len();
        let landmarks: [Landmark; LANDMARK_COUNT] = json
            .landmarks
            .try_into()
            .map_err(|_| format!("expected {} landmarks, got {}", LANDMARK_COUNT, count))?;
        if let Some(i) = landmarks.iter().position(|p| {
            !COORD_RANGE.contains(&p.x) || !COORD_RANGE.contains(&p.y) || !p.z.is_finite()
        }) {
            return Err(format!(
                "landmark {} out of range: ({}, {})",
                i, landmarks[i].x, landmarks[i].y
            ));
        }
        Ok(Self {
            landmarks,
            handedness: json.handedness,
            score: json.score,
        })
    }
}

#[derive(Deserialize)]
struct FrameJson {
    #[serde(default)]
    hands: Vec<Hand>,
}

/// Parse one JSON line into the hands of a frame, in detection order.
pub fn parse_frame(line: &str) -> Result<Vec<Hand>> {
    let frame: FrameJson = serde_json::from_str(line)?;
    Ok(frame.hands)
}

/// Encode a frame in the same line format [`parse_frame`] reads (used for recordings).
pub fn frame_line(hands: &[Hand]) -> Result<String> {
    Ok(serde_json::to_string(&serde_json::json!({ "hands": hands }))?)
}

/// Drop hands under the detection threshold and keep at most `max_hands`, preserving order.
pub fn filter_hands(hands: Vec<Hand>, max_hands: usize, min_confidence: f32) -> Vec<Hand> {
    hands
        .into_iter()
        .filter(|h| h.score >= min_confidence)
        .take(max_hands)
        .collect()
}
