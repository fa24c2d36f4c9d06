use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::signs::{GlyphAtlas, Label, RECOGNIZABLE};
use crate::stability::DEFAULT_THRESHOLD;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Repeats of the same prediction needed before it commits
    #[serde(default = "default_stability_frames")]
    pub stability_frames: u32,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stability_frames: default_stability_frames(),
            game: GameConfig::default(),
            playback: PlaybackConfig::default(),
            speech: SpeechConfig::default(),
            tracker: TrackerConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

fn default_stability_frames() -> u32 {
    DEFAULT_THRESHOLD
}

// ============================================================================
// Game Config
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GameConfig {
    /// Letters the game asks for; must be ones the classifier can recognize
    #[serde(default = "default_game_labels")]
    pub labels: Vec<Label>,
    /// Pause after a match before the next target
    #[serde(default = "default_celebration_ms")]
    pub celebration_ms: u64,
    /// Fixed RNG seed for reproducible target sequences
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            labels: default_game_labels(),
            celebration_ms: default_celebration_ms(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn celebration_delay(&self) -> Duration {
        Duration::from_millis(self.celebration_ms)
    }
}

fn default_game_labels() -> Vec<Label> {
    RECOGNIZABLE.to_vec()
}

fn default_celebration_ms() -> u64 {
    2000
}

// ============================================================================
// Playback Config
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Restrict the glyph atlas; letters outside it are skipped. Empty = full alphabet.
    #[serde(default)]
    pub letters: Vec<Label>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            letters: Vec::new(),
        }
    }
}

impl PlaybackConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn atlas(&self) -> GlyphAtlas {
        if self.letters.is_empty() {
            GlyphAtlas::full()
        } else {
            GlyphAtlas::only(&self.letters)
        }
    }
}

fn default_tick_ms() -> u64 {
    800
}

// ============================================================================
// Speech Config
// ============================================================================

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEngineKind {
    /// Spawn `command` per utterance
    #[default]
    System,
    None,
}

#[derive(Debug, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub engine: SpeechEngineKind,
    #[serde(default = "default_speech_command")]
    pub command: String,
    /// Speaking rate multiplier (0.5-2.0)
    #[serde(default = "default_speech_rate")]
    pub rate: f32,
    /// Play a chime on a game match
    #[serde(default = "default_chime")]
    pub chime: bool,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine: SpeechEngineKind::default(),
            command: default_speech_command(),
            rate: default_speech_rate(),
            chime: default_chime(),
        }
    }
}

fn default_speech_command() -> String {
    if cfg!(target_os = "macos") {
        "say".into()
    } else {
        "espeak-ng".into()
    }
}

fn default_speech_rate() -> f32 {
    1.0
}

fn default_chime() -> bool {
    true
}

// ============================================================================
// Tracker Config
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct TrackerConfig {
    #[serde(default = "default_max_hands")]
    pub max_hands: usize,
    #[serde(default = "default_confidence")]
    pub min_detection_confidence: f32,
    #[serde(default = "default_confidence")]
    pub min_tracking_confidence: f32,
    /// Replay pacing for recorded frames; 0 = as fast as possible
    #[serde(default = "default_replay_fps")]
    pub replay_fps: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_hands: default_max_hands(),
            min_detection_confidence: default_confidence(),
            min_tracking_confidence: default_confidence(),
            replay_fps: default_replay_fps(),
        }
    }
}

fn default_max_hands() -> usize {
    2
}

fn default_confidence() -> f32 {
    0.5
}

fn default_replay_fps() -> u32 {
    30
}

// ============================================================================
// Remote Config
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_ms: default_poll_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".into()
}

fn default_poll_ms() -> u64 {
    500
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Path::new("config.toml");
        if path.exists() {
            Self::from_path(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| Error::Config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stability_frames == 0 {
            return Err(Error::Config("stability_frames must be at least 1".into()));
        }
        if self.game.labels.is_empty() {
            return Err(Error::Config("game.labels must not be empty".into()));
        }
        if let Some(label) = self.game.labels.iter().find(|l| !RECOGNIZABLE.contains(l)) {
            return Err(Error::Config(format!(
                "game label {} cannot be recognized (choose from A, B, L, V)",
                label
            )));
        }
        if self.playback.tick_ms == 0 {
            return Err(Error::Config("playback.tick_ms must be positive".into()));
        }
        if self.tracker.max_hands == 0 {
            return Err(Error::Config("tracker.max_hands must be at least 1".into()));
        }
        if self.remote.poll_ms == 0 {
            return Err(Error::Config("remote.poll_ms must be positive".into()));
        }
        Ok(())
    }
}
