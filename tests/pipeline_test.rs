//! Recorded landmark frames through the replay source, the recognizer and the app.

use std::io::Write;

use tempfile::NamedTempFile;

use signtutor::app::{self, App, SessionIo};
use signtutor::config::Config;
use signtutor::landmark::{Hand, Handedness, LANDMARK_COUNT, Landmark, frame_line, idx};
use signtutor::recognizer::Recognizer;
use signtutor::render::Ui;
use signtutor::signs::Label;
use signtutor::source::{self, LandmarkPipeline, RecognitionEvent, ReplaySource};
use signtutor::speech::{NullSpeech, Speech};

/// A right hand with the given fingers (index, middle, ring, pinky) pointing up.
fn hand(up: [bool; 4]) -> Hand {
    let mut lm = [Landmark::new(0.5, 0.8, 0.0); LANDMARK_COUNT];
    let fingers = [
        (idx::INDEX_PIP, idx::INDEX_TIP, 0.40),
        (idx::MIDDLE_PIP, idx::MIDDLE_TIP, 0.48),
        (idx::RING_PIP, idx::RING_TIP, 0.56),
        (idx::PINKY_PIP, idx::PINKY_TIP, 0.64),
    ];
    for ((pip, tip, x), is_up) in fingers.into_iter().zip(up) {
        lm[pip] = Landmark::new(x, 0.5, 0.0);
        lm[tip] = Landmark::new(x, if is_up { 0.3 } else { 0.6 }, 0.0);
    }
    lm[idx::THUMB_MCP] = Landmark::new(0.5, 0.6, 0.0);
    lm[idx::THUMB_TIP] = Landmark::new(0.55, 0.55, 0.0);
    Hand::new(lm, Handedness::Right)
}

fn recording(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

fn frames(hands: &[Hand], count: usize) -> Vec<String> {
    vec![frame_line(hands).unwrap(); count]
}

fn replay(file: &NamedTempFile, threshold: u32) -> flume::Receiver<RecognitionEvent> {
    let pipeline = LandmarkPipeline::new(Recognizer::new(threshold), 2, 0.5);
    let (tx, rx) = source::channel();
    source::spawn(Box::new(ReplaySource::new(file.path(), 0, pipeline)), tx).unwrap();
    rx
}

#[test]
fn test_replay_commits_held_signs() {
    let fist = hand([false; 4]);
    let v = hand([true, true, false, false]);

    let mut lines = frames(&[fist.clone()], 4);
    lines.push("not json".to_string());
    lines.extend(frames(&[], 2));
    lines.extend(frames(&[v], 4));
    let file = recording(&lines);

    // Frames may be dropped under load, commits never are
    let events: Vec<RecognitionEvent> = replay(&file, 3).iter().collect();
    let commits: Vec<Label> = events
        .iter()
        .filter_map(|e| match e {
            RecognitionEvent::Commit(label) => Some(*label),
            _ => None,
        })
        .collect();
    assert_eq!(commits, vec![Label::A, Label::V]);
    assert_eq!(events.last(), Some(&RecognitionEvent::Ended));
    assert!(events.iter().all(|e| !matches!(e, RecognitionEvent::SourceError(_))));
}

#[test]
fn test_replay_missing_file_reports_error_then_ends() {
    let file = recording(&[]);
    let path = file.path().to_path_buf();
    drop(file);

    let pipeline = LandmarkPipeline::new(Recognizer::new(3), 2, 0.5);
    let (tx, rx) = source::channel();
    source::spawn(Box::new(ReplaySource::new(path, 0, pipeline)), tx).unwrap();
    let events: Vec<RecognitionEvent> = rx.iter().collect();
    assert!(matches!(
        events.as_slice(),
        [RecognitionEvent::SourceError(_), RecognitionEvent::Ended]
    ));
}

#[tokio::test]
async fn test_replay_session_builds_transcript() {
    let mut lines = frames(&[hand([true; 4])], 4);
    lines.extend(frames(&[hand([false; 4])], 4));
    let file = recording(&lines);

    let mut config = Config::default();
    config.stability_frames = 3;
    let (ui, _ui_rx) = Ui::new();
    let io = SessionIo {
        ui,
        speech: Speech::new(Box::new(NullSpeech), 1.0, false),
        input: None,
        recognition: Some(replay(&file, config.stability_frames)),
        remote: None,
    };

    // No prompt: the session ends with the recording
    let app = app::run(App::new(&config).with_source(false), io).await;
    assert_eq!(app.transcript().text(), "BA");
    assert_eq!(app.stats().total_commits(), 2);
}
