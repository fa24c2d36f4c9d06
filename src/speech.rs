use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use crate::config::{SpeechConfig, SpeechEngineKind};
use crate::error::{Error, Result};

pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 2.0;

/// Words per minute at rate 1.0
const BASE_WPM: f32 = 175.0;

pub trait SpeechEngine: Send {
    /// Start speaking `text`. Fire-and-forget: returns once playback is launched.
    fn speak(&self, text: &str, rate: f32) -> Result<()>;
}

// ============================================================================
// System TTS - `say` on macOS, `espeak-ng` elsewhere
// ============================================================================

pub struct SystemSpeech {
    program: String,
}

impl SystemSpeech {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn rate_flag(&self) -> &'static str {
        let name = std::path::Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name == "say" { "-r" } else { "-s" }
    }
}

impl SpeechEngine for SystemSpeech {
    fn speak(&self, text: &str, rate: f32) -> Result<()> {
        let wpm = (BASE_WPM * rate).round() as u32;
        let mut child = Command::new(&self.program)
            .arg(self.rate_flag())
            .arg(wpm.to_string())
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Speech(format!("{}: {}", self.program, e)))?;

        // Reap in the background so the caller never waits on speech
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

/// Discards speech (tests, or `engine = "none"`)
pub struct NullSpeech;

impl SpeechEngine for NullSpeech {
    fn speak(&self, _text: &str, _rate: f32) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Speech output - engine, current rate, match chime
// ============================================================================

pub struct Speech {
    engine: Box<dyn SpeechEngine>,
    rate: f32,
    chime: bool,
}

impl Speech {
    pub fn new(engine: Box<dyn SpeechEngine>, rate: f32, chime: bool) -> Self {
        Self {
            engine,
            rate: clamp_rate(rate),
            chime,
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        let engine: Box<dyn SpeechEngine> = match config.engine {
            SpeechEngineKind::System => Box::new(SystemSpeech::new(config.command.clone())),
            SpeechEngineKind::None => Box::new(NullSpeech),
        };
        Self::new(engine, config.rate, config.chime)
    }

    pub fn speak(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        debug!(rate = self.rate, "speaking {:?}", text);
        self.engine.speak(text, self.rate)
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Set the rate, clamped to [`MIN_RATE`]..=[`MAX_RATE`]; returns the applied value.
    pub fn set_rate(&mut self, rate: f32) -> f32 {
        self.rate = clamp_rate(rate);
        self.rate
    }

    /// Short rising arpeggio on the default output device.
    pub fn chime(&self) {
        if !self.chime {
            return;
        }
        thread::spawn(|| {
            let stream = match OutputStreamBuilder::open_default_stream() {
                Ok(s) => s,
                Err(e) => {
                    warn!("no audio output for chime: {}", e);
                    return;
                }
            };
            let sink = Sink::connect_new(stream.mixer());
            for freq in [523.25, 659.25, 783.99] {
                sink.append(
                    SineWave::new(freq)
                        .take_duration(Duration::from_millis(120))
                        .amplify(0.2),
                );
            }
            sink.sleep_until_end();
            std::mem::forget(stream); // Suppress "Dropping OutputStream" warning
        });
    }
}

/// Clamp to [`MIN_RATE`]..=[`MAX_RATE`]; non-finite input resets to 1.0.
pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_finite() {
        rate.clamp(MIN_RATE, MAX_RATE)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recording(Arc<Mutex<Vec<(String, f32)>>>);

    impl SpeechEngine for Recording {
        fn speak(&self, text: &str, rate: f32) -> Result<()> {
            self.0.lock().unwrap().push((text.to_string(), rate));
            Ok(())
        }
    }

    #[test]
    fn test_rate_clamped() {
        let mut speech = Speech::new(Box::new(NullSpeech), 5.0, false);
        assert_eq!(speech.rate(), MAX_RATE);
        assert_eq!(speech.set_rate(0.1), MIN_RATE);
        assert_eq!(speech.set_rate(1.25), 1.25);
        assert_eq!(speech.set_rate(f32::NAN), 1.0);
    }

    #[test]
    fn test_blank_text_not_spoken() {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let speech = Speech::new(Box::new(Recording(Arc::clone(&spoken))), 1.5, false);
        speech.speak("   ").unwrap();
        speech.speak(" AB ").unwrap();
        assert_eq!(*spoken.lock().unwrap(), vec![("AB".to_string(), 1.5)]);
    }

    #[test]
    fn test_rate_flag() {
        assert_eq!(SystemSpeech::new("/usr/bin/say").rate_flag(), "-r");
        assert_eq!(SystemSpeech::new("espeak-ng").rate_flag(), "-s");
    }

    #[test]
    fn test_missing_program_is_speech_error() {
        let engine = SystemSpeech::new("signtutor-no-such-tts-program");
        assert!(matches!(engine.speak("A", 1.0), Err(Error::Speech(_))));
    }
}
