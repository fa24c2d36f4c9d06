//! Sign labels and the glyph atlas used for display and text-to-sign playback.

use std::fmt;

/// Placeholder glyph shown for a space during playback.
pub const SPACE_GLYPH: &str = "⏳";

/// Caption shown next to [`SPACE_GLYPH`].
pub const SPACE_CAPTION: &str = "Space";

/// A single-letter sign identifier, always an uppercase ASCII letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(char);

impl Label {
    pub const A: Label = Label('A');
    pub const B: Label = Label('B');
    pub const L: Label = Label('L');
    pub const V: Label = Label('V');

    /// Build a label from a letter, case-insensitively. Non-letters yield `None`.
    pub fn new(c: char) -> Option<Self> {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase().then_some(Label(c))
    }

    pub fn as_char(self) -> char {
        self.0
    }

    /// The atlas glyph for this letter.
    pub fn glyph(self) -> &'static str {
        ATLAS[(self.0 as u8 - b'A') as usize]
    }

    /// Every label of the alphabet, `A` through `Z`.
    pub fn alphabet() -> impl Iterator<Item = Label> {
        (b'A'..=b'Z').map(|b| Label(b as char))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Label {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Label::new(c).ok_or_else(|| format!("'{}' is not a letter", value)),
            _ => Err(format!("'{}' is not a single letter", value)),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Label {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Label::try_from(s).map_err(serde::de::Error::custom)
    }
}

/// The labels the heuristic classifier can produce.
pub const RECOGNIZABLE: [Label; 4] = [Label::A, Label::B, Label::L, Label::V];

const ATLAS: [&str; 26] = [
    "👊", "✋", "👌", "☝️", "✊", // A-E
    "👌", "👈", "👈", "☝️", "☝️", // F-J
    "✌️", "👆", "✋", "✋", "👌", // K-O
    "☝️", "👈", "✌️", "👊", "👊", // P-T
    "✌️", "✌️", "🖖", "☝️", "🤙", // U-Y
    "☝️", // Z
];

/// Letters that playback is allowed to show. Letters outside the atlas are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphAtlas {
    letters: Vec<Label>,
}

impl GlyphAtlas {
    /// The whole alphabet.
    pub fn full() -> Self {
        Self {
            letters: Label::alphabet().collect(),
        }
    }

    /// Only the given letters.
    pub fn only(letters: &[Label]) -> Self {
        let mut letters = letters.to_vec();
        letters.sort();
        letters.dedup();
        Self { letters }
    }

    pub fn glyph(&self, label: Label) -> Option<&'static str> {
        self.letters
            .binary_search(&label)
            .ok()
            .map(|_| label.glyph())
    }

    pub fn letters(&self) -> &[Label] {
        &self.letters
    }

    /// `A 👊  B ✋ ...`, wrapped every `per_row` letters.
    pub fn listing(&self, per_row: usize) -> String {
        self.letters
            .chunks(per_row.max(1))
            .map(|row| {
                row.iter()
                    .map(|l| format!("{} {}", l, l.glyph()))
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for GlyphAtlas {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_new() {
        assert_eq!(Label::new('a'), Some(Label::A));
        assert_eq!(Label::new('V'), Some(Label::V));
        assert_eq!(Label::new('1'), None);
        assert_eq!(Label::new(' '), None);
        assert_eq!(Label::new('é'), None);
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(Label::A.glyph(), "👊");
        assert_eq!(Label::B.glyph(), "✋");
        assert_eq!(Label::new('W').unwrap().glyph(), "🖖");
        assert_eq!(Label::new('Z').unwrap().glyph(), "☝️");
        assert_eq!(Label::alphabet().count(), 26);
    }

    #[test]
    fn test_label_from_string() {
        assert_eq!(Label::try_from("l".to_string()), Ok(Label::L));
        assert!(Label::try_from("AB".to_string()).is_err());
        assert!(Label::try_from("".to_string()).is_err());
        assert!(Label::try_from("7".to_string()).is_err());
    }

    #[test]
    fn test_restricted_atlas() {
        let atlas = GlyphAtlas::only(&[Label::V, Label::A, Label::A]);
        assert_eq!(atlas.letters(), &[Label::A, Label::V]);
        assert_eq!(atlas.glyph(Label::A), Some("👊"));
        assert_eq!(atlas.glyph(Label::B), None);
        assert_eq!(GlyphAtlas::full().glyph(Label::B), Some("✋"));
    }

    #[test]
    fn test_listing() {
        let atlas = GlyphAtlas::only(&[Label::A, Label::B, Label::L]);
        assert_eq!(atlas.listing(2), "A 👊  B ✋\nL 👆");
        assert_eq!(GlyphAtlas::full().listing(13).lines().count(), 2);
    }
}
