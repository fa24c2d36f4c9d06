//! Recognition sources: anything that turns an outside signal into recognition events.
//!
//! Sources run on their own thread and talk to the dispatch loop only through an
//! [`EventSink`]. Frame reports are lossy (dropped while the loop is busy); commits and
//! lifecycle events are never dropped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{Config, TrackerConfig};
use crate::landmark::{filter_hands, parse_frame};
use crate::recognizer::{FrameReport, Recognizer};
use crate::signs::Label;

/// Frame reports that may queue up before new ones are dropped.
pub const FRAME_QUEUE: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// A processed frame with at least one hand
    Frame(FrameReport),
    /// A frame without hands; the classifier was not consulted
    NoHands,
    /// A label passed the stability filter
    Commit(Label),
    SourceError(String),
    /// The source has nothing more to deliver
    Ended,
}

pub fn channel() -> (flume::Sender<RecognitionEvent>, flume::Receiver<RecognitionEvent>) {
    flume::bounded(FRAME_QUEUE)
}

#[derive(Clone)]
pub struct EventSink {
    tx: flume::Sender<RecognitionEvent>,
}

impl EventSink {
    pub fn new(tx: flume::Sender<RecognitionEvent>) -> Self {
        Self { tx }
    }

    /// Offer a per-frame event; dropped if the queue is full. Returns `false` once the
    /// receiver is gone.
    pub fn offer(&self, event: RecognitionEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(flume::TrySendError::Full(_)) => {
                debug!("dispatch busy, frame dropped");
                true
            }
            Err(flume::TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_disconnected()
    }

    /// Deliver an event, waiting for room. Returns `false` once the receiver is gone.
    pub fn send(&self, event: RecognitionEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub trait RecognitionSource: Send {
    fn name(&self) -> &str;

    /// Produce events until the input ends or the sink is closed.
    fn run(self: Box<Self>, sink: &EventSink);
}

/// Run `source` on a named thread. `Ended` is always the last event it sends.
pub fn spawn(
    source: Box<dyn RecognitionSource>,
    tx: flume::Sender<RecognitionEvent>,
) -> std::io::Result<JoinHandle<()>> {
    let name = format!("source-{}", source.name());
    thread::Builder::new().name(name).spawn(move || {
        let sink = EventSink::new(tx);
        info!(source = source.name(), "recognition source started");
        source.run(&sink);
        sink.send(RecognitionEvent::Ended);
    })
}

// ============================================================================
// In-process landmark pipeline
// ============================================================================

/// Landmark lines in, recognition events out.
pub struct LandmarkPipeline {
    recognizer: Recognizer,
    max_hands: usize,
    min_confidence: f32,
}

impl LandmarkPipeline {
    pub fn new(recognizer: Recognizer, max_hands: usize, min_confidence: f32) -> Self {
        Self {
            recognizer,
            max_hands,
            min_confidence,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Recognizer::new(config.stability_frames),
            config.tracker.max_hands,
            config.tracker.min_detection_confidence,
        )
    }

    /// Handle one input line. Malformed lines are logged and skipped. Returns `false`
    /// once the sink is closed.
    pub fn feed(&mut self, line: &str, sink: &EventSink) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }
        let hands = match parse_frame(line) {
            Ok(hands) => filter_hands(hands, self.max_hands, self.min_confidence),
            Err(e) => {
                warn!("skipping landmark line: {}", e);
                return true;
            }
        };
        if hands.is_empty() {
            return sink.offer(RecognitionEvent::NoHands);
        }

        let report = self.recognizer.process_frame(hands);
        let commits = report.commits.clone();
        if !sink.offer(RecognitionEvent::Frame(report)) {
            return false;
        }
        commits
            .into_iter()
            .all(|label| sink.send(RecognitionEvent::Commit(label)))
    }

    /// Feed every line of `reader`, sleeping `pace` before each frame. Returns `false`
    /// if it stopped because the sink closed.
    fn pump(&mut self, reader: impl BufRead, pace: Option<Duration>, sink: &EventSink) -> bool {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => return sink.send(RecognitionEvent::SourceError(e.to_string())),
            };
            if let Some(pace) = pace {
                thread::sleep(pace);
            }
            if !self.feed(&line, sink) {
                debug!("event sink closed");
                return false;
            }
        }
        true
    }
}

// ============================================================================
// Replay: JSON lines from a recording
// ============================================================================

pub struct ReplaySource {
    path: PathBuf,
    fps: u32,
    pipeline: LandmarkPipeline,
}

impl ReplaySource {
    /// `fps == 0` replays without pacing.
    pub fn new(path: impl Into<PathBuf>, fps: u32, pipeline: LandmarkPipeline) -> Self {
        Self {
            path: path.into(),
            fps,
            pipeline,
        }
    }
}

impl RecognitionSource for ReplaySource {
    fn name(&self) -> &str {
        "replay"
    }

    fn run(mut self: Box<Self>, sink: &EventSink) {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                sink.send(RecognitionEvent::SourceError(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )));
                return;
            }
        };
        let pace = (self.fps > 0).then(|| Duration::from_secs(1) / self.fps);
        self.pipeline.pump(BufReader::new(file), pace, sink);
    }
}

// ============================================================================
// Tracker: JSON lines on the stdout of a child process
// ============================================================================

/// Runs an external hand tracker and reads its stdout. Detection settings are passed in
/// the environment as `SIGNTUTOR_MAX_HANDS`, `SIGNTUTOR_MIN_DETECTION_CONFIDENCE` and
/// `SIGNTUTOR_MIN_TRACKING_CONFIDENCE`.
pub struct TrackerSource {
    program: String,
    args: Vec<String>,
    tracker: TrackerConfig,
    pipeline: LandmarkPipeline,
}

impl TrackerSource {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        tracker: TrackerConfig,
        pipeline: LandmarkPipeline,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            tracker,
            pipeline,
        }
    }
}

impl RecognitionSource for TrackerSource {
    fn name(&self) -> &str {
        "tracker"
    }

    fn run(mut self: Box<Self>, sink: &EventSink) {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .env("SIGNTUTOR_MAX_HANDS", self.tracker.max_hands.to_string())
            .env(
                "SIGNTUTOR_MIN_DETECTION_CONFIDENCE",
                self.tracker.min_detection_confidence.to_string(),
            )
            .env(
                "SIGNTUTOR_MIN_TRACKING_CONFIDENCE",
                self.tracker.min_tracking_confidence.to_string(),
            )
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                sink.send(RecognitionEvent::SourceError(format!(
                    "failed to start tracker {}: {}",
                    self.program, e
                )));
                return;
            }
        };
        info!(program = %self.program, pid = child.id(), "tracker started");

        let connected = match child.stdout.take() {
            Some(stdout) => self.pipeline.pump(BufReader::new(stdout), None, sink),
            None => true,
        };
        if !connected {
            let _ = child.kill();
        }
        match child.wait() {
            Ok(status) if !status.success() => {
                sink.send(RecognitionEvent::SourceError(format!(
                    "tracker exited with {}",
                    status
                )));
            }
            Ok(_) => {}
            Err(e) => warn!("failed to reap tracker: {}", e),
        }
    }
}
