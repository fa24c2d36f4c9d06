//! Dispatch: every trigger (recognition, user command, timer) becomes an [`AppEvent`].
//! [`App::handle`] is a pure state transition returning [`Effect`]s; [`run`] owns the
//! timers and the side effects.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::command::{self, HELP, UserCommand};
use crate::config::Config;
use crate::game::{GamePhase, GameSession};
use crate::landmark::Hand;
use crate::playback::{Playback, PlaybackStep, normalize};
use crate::remote::RemoteCommand;
use crate::render::{Ui, UiEvent};
use crate::signs::Label;
use crate::skeleton::{draw_commands, rasterize};
use crate::source::RecognitionEvent;
use crate::speech::{Speech, clamp_rate};
use crate::stats::FrameStats;
use crate::status_bar::{SourceStatus, StatusBarState};
use crate::transcript::Transcript;

const SKELETON_COLS: usize = 48;
const SKELETON_ROWS: usize = 20;
const ATLAS_PER_ROW: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Recognition(RecognitionEvent),
    Command(UserCommand),
    /// The celebration delay of `round` is over
    RoundElapsed(u64),
    /// Playback interval fired for `generation`
    PlaybackTick(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Ui(UiEvent),
    Speak(String),
    SetSpeechRate(f32),
    Chime,
    ScheduleRound { round: u64, after: Duration },
    ScheduleTick { generation: u64, after: Duration },
    ClearRemote,
    Quit,
}

pub struct App {
    transcript: Transcript,
    game: GameSession,
    playback: Playback,
    stats: FrameStats,
    source: SourceStatus,
    last_hand: Option<Hand>,
    prediction: Option<Label>,
    hands: usize,
    speech_rate: f32,
    celebration: Duration,
    tick: Duration,
    quit_when_source_ends: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let rng = match config.game.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            transcript: Transcript::new(),
            game: GameSession::new(&config.game.labels, rng),
            playback: Playback::new(config.playback.atlas()),
            stats: FrameStats::default(),
            source: SourceStatus::Offline,
            last_hand: None,
            prediction: None,
            hands: 0,
            speech_rate: clamp_rate(config.speech.rate),
            celebration: config.game.celebration_delay(),
            tick: config.playback.tick(),
            quit_when_source_ends: false,
        }
    }

    /// A source is attached; optionally quit once it ends.
    pub fn with_source(mut self, quit_when_source_ends: bool) -> Self {
        self.source = SourceStatus::Tracking;
        self.quit_when_source_ends = quit_when_source_ends;
        self
    }

    pub fn handle(&mut self, event: AppEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            AppEvent::Recognition(event) => self.on_recognition(event, &mut effects),
            AppEvent::Command(command) => self.on_command(command, &mut effects),
            AppEvent::RoundElapsed(round) => {
                if let Some(target) = self.game.on_round_elapsed(round) {
                    effects.push(Effect::Ui(UiEvent::Target(target)));
                }
            }
            AppEvent::PlaybackTick(generation) => self.on_playback_tick(generation, &mut effects),
        }
        effects.push(Effect::Ui(UiEvent::Status(self.status_bar())));
        effects
    }

    fn on_recognition(&mut self, event: RecognitionEvent, effects: &mut Vec<Effect>) {
        match event {
            RecognitionEvent::Frame(report) => {
                self.stats.record_frame(&report);
                self.hands = report.hands.len();
                self.prediction = report.predictions.first().copied().flatten();
                self.last_hand = report.hands.into_iter().next();
            }
            RecognitionEvent::NoHands => {
                self.stats.record_empty_frame();
                self.hands = 0;
                self.prediction = None;
            }
            RecognitionEvent::Commit(label) => {
                self.stats.record_commit(label);
                self.transcript.push(label);
                effects.push(self.transcript_event());
                if let Some(round) = self.game.on_commit(label) {
                    info!(%label, score = self.game.score(), "target matched");
                    effects.push(Effect::Ui(UiEvent::Celebrate {
                        score: self.game.score(),
                    }));
                    effects.push(Effect::Chime);
                    effects.push(Effect::ScheduleRound {
                        round,
                        after: self.celebration,
                    });
                }
            }
            RecognitionEvent::SourceError(message) => {
                warn!("recognition source: {}", message);
                self.source = SourceStatus::Failed;
                effects.push(Effect::Ui(UiEvent::Error(format!("Source error: {}", message))));
            }
            RecognitionEvent::Ended => {
                info!("recognition source ended");
                self.hands = 0;
                self.prediction = None;
                if self.source != SourceStatus::Failed {
                    self.source = SourceStatus::Ended;
                }
                effects.push(Effect::Ui(UiEvent::Message("Recognition source ended.".into())));
                if self.quit_when_source_ends {
                    effects.push(Effect::Quit);
                }
            }
        }
    }

    fn on_command(&mut self, command: UserCommand, effects: &mut Vec<Effect>) {
        debug!(?command, "command");
        match command {
            UserCommand::Start => {
                let target = self.game.start();
                effects.push(message("Game started. Score reset to 0."));
                effects.push(Effect::Ui(UiEvent::Target(target)));
            }
            UserCommand::Stop => {
                if self.game.is_active() {
                    self.game.stop();
                    effects.push(Effect::Ui(UiEvent::GameOver {
                        score: self.game.score(),
                    }));
                } else {
                    effects.push(message("No game running."));
                }
            }
            UserCommand::Clear => {
                self.transcript.clear();
                effects.push(self.transcript_event());
                effects.push(Effect::ClearRemote);
            }
            UserCommand::Space => {
                self.transcript.add_space();
                effects.push(self.transcript_event());
            }
            UserCommand::Speak => {
                if self.transcript.is_empty() {
                    effects.push(message("Nothing to speak yet."));
                } else {
                    effects.push(Effect::Speak(self.transcript.text().to_string()));
                }
            }
            UserCommand::Speed(rate) => {
                self.speech_rate = clamp_rate(rate);
                effects.push(Effect::SetSpeechRate(self.speech_rate));
                effects.push(message(&format!("Speech rate {:.2}x", self.speech_rate)));
            }
            UserCommand::Play(text) => match self.playback.start(&text) {
                Some(generation) => {
                    effects.push(message(&format!("Playing: {}", normalize(&text))));
                    effects.push(Effect::ScheduleTick {
                        generation,
                        after: self.tick,
                    });
                }
                None => effects.push(message("Nothing to play (letters A-Z only).")),
            },
            UserCommand::Show(label) => match self.playback.atlas().glyph(label) {
                Some(glyph) => effects.push(Effect::Ui(UiEvent::Glyph { label, glyph })),
                None => effects.push(Effect::Ui(UiEvent::Error(format!("No sign for {}", label)))),
            },
            UserCommand::Atlas => {
                effects.push(message(&self.playback.atlas().listing(ATLAS_PER_ROW)));
            }
            UserCommand::Hand => match &self.last_hand {
                Some(hand) => {
                    let commands =
                        draw_commands(hand, SKELETON_COLS as f32, SKELETON_ROWS as f32);
                    effects.push(Effect::Ui(UiEvent::Skeleton(rasterize(
                        &commands,
                        SKELETON_COLS,
                        SKELETON_ROWS,
                    ))));
                }
                None => effects.push(message("No hand tracked yet.")),
            },
            UserCommand::Status => effects.push(message(&self.status_text())),
            UserCommand::Stats => effects.push(message(self.stats.summary().trim_end())),
            UserCommand::Help => effects.push(message(HELP)),
            UserCommand::Quit => effects.push(Effect::Quit),
        }
    }

    fn on_playback_tick(&mut self, generation: u64, effects: &mut Vec<Effect>) {
        let Some(step) = self.playback.tick(generation) else {
            return;
        };
        let event = match step {
            PlaybackStep::Glyph { label, glyph } => UiEvent::Glyph { label, glyph },
            PlaybackStep::Space => UiEvent::PlaybackSpace,
            PlaybackStep::Done => {
                effects.push(Effect::Ui(UiEvent::PlaybackDone));
                return;
            }
        };
        effects.push(Effect::Ui(event));
        effects.push(Effect::ScheduleTick {
            generation,
            after: self.tick,
        });
    }

    fn transcript_event(&self) -> Effect {
        Effect::Ui(UiEvent::Transcript(self.transcript.text().to_string()))
    }

    fn status_text(&self) -> String {
        let target = match (self.game.phase(), self.game.target()) {
            (GamePhase::Inactive, _) | (_, None) => "-".to_string(),
            (_, Some(target)) => target.to_string(),
        };
        format!(
            "Game: {}, Target: {}, Score: {}\nTranscript: {}\nSource: {:?}, Speech rate: {:.2}x, Playback: {}",
            self.game.phase(),
            target,
            self.game.score(),
            self.transcript.display(),
            self.source,
            self.speech_rate,
            if self.playback.is_running() { "running" } else { "idle" },
        )
    }

    pub fn status_bar(&self) -> StatusBarState {
        StatusBarState {
            source: self.source,
            prediction: self.prediction,
            hands: self.hands,
            phase: self.game.phase(),
            target: self.game.target(),
            score: self.game.score(),
            speech_rate: self.speech_rate,
            letters: self.transcript.letter_count(),
            ..StatusBarState::default()
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn game(&self) -> &GameSession {
        &self.game
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

fn message(text: &str) -> Effect {
    Effect::Ui(UiEvent::Message(text.to_string()))
}

// ============================================================================
// Dispatch loop
// ============================================================================

/// Everything the loop talks to besides the [`App`] itself.
pub struct SessionIo {
    pub ui: Ui,
    pub speech: Speech,
    /// Lines typed at the prompt
    pub input: Option<flume::Receiver<String>>,
    pub recognition: Option<flume::Receiver<RecognitionEvent>>,
    pub remote: Option<flume::Sender<RemoteCommand>>,
}

/// A pending timer: fire time plus the id it was scheduled for.
type Deadline = Option<(Instant, u64)>;

async fn wait_for(deadline: Deadline) -> u64 {
    match deadline {
        Some((at, id)) => {
            sleep_until(at).await;
            id
        }
        None => std::future::pending().await,
    }
}

/// Next message, or `None` once the channel closes. Never resolves without a channel.
async fn next<T>(rx: &Option<flume::Receiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv_async().await.ok(),
        None => std::future::pending().await,
    }
}

/// Drive `app` until the user quits, or until both input and recognition have closed.
/// Returns the app for a final report.
pub async fn run(mut app: App, mut io: SessionIo) -> App {
    let mut round_deadline: Deadline = None;
    let mut tick_deadline: Deadline = None;
    io.ui.send(UiEvent::Transcript(String::new()));
    io.ui.send(UiEvent::Status(app.status_bar()));

    loop {
        let event = tokio::select! {
            biased;

            line = next(&io.input) => match line {
                Some(line) => match command::parse(&line) {
                    Ok(Some(command)) => AppEvent::Command(command),
                    Ok(None) => continue,
                    Err(message) => {
                        io.ui.show_error(&message);
                        continue;
                    }
                },
                None => {
                    io.input = None;
                    if io.recognition.is_none() {
                        break;
                    }
                    continue;
                }
            },

            round = wait_for(round_deadline) => {
                round_deadline = None;
                AppEvent::RoundElapsed(round)
            }

            generation = wait_for(tick_deadline) => {
                tick_deadline = None;
                AppEvent::PlaybackTick(generation)
            }

            event = next(&io.recognition) => match event {
                Some(event) => AppEvent::Recognition(event),
                None => {
                    io.recognition = None;
                    if io.input.is_none() {
                        break;
                    }
                    continue;
                }
            },
        };

        let mut quit = false;
        for effect in app.handle(event) {
            match effect {
                Effect::Ui(event) => io.ui.send(event),
                Effect::Speak(text) => {
                    if let Err(e) = io.speech.speak(&text) {
                        warn!("speech failed: {}", e);
                        io.ui.show_error(&e.to_string());
                    }
                }
                Effect::SetSpeechRate(rate) => {
                    io.speech.set_rate(rate);
                }
                Effect::Chime => io.speech.chime(),
                Effect::ScheduleRound { round, after } => {
                    round_deadline = Some((Instant::now() + after, round));
                }
                Effect::ScheduleTick { generation, after } => {
                    tick_deadline = Some((Instant::now() + after, generation));
                }
                Effect::ClearRemote => {
                    if let Some(remote) = &io.remote {
                        let _ = remote.send(RemoteCommand::ClearText);
                    }
                }
                Effect::Quit => quit = true,
            }
        }
        if quit {
            break;
        }
    }

    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::fixtures::hand;
    use crate::landmark::Handedness;
    use crate::recognizer::FrameReport;

    fn app() -> App {
        let mut config = Config::default();
        config.game.seed = Some(11);
        App::new(&config)
    }

    fn ui_events(effects: &[Effect]) -> Vec<&UiEvent> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Ui(UiEvent::Status(_)) => None,
                Effect::Ui(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    fn commit(app: &mut App, label: Label) -> Vec<Effect> {
        app.handle(AppEvent::Recognition(RecognitionEvent::Commit(label)))
    }

    #[test]
    fn test_commits_build_transcript() {
        let mut app = app();
        commit(&mut app, Label::A);
        let effects = commit(&mut app, Label::B);
        assert_eq!(
            ui_events(&effects),
            vec![&UiEvent::Transcript("AB".into())]
        );
        app.handle(AppEvent::Command(UserCommand::Space));
        app.handle(AppEvent::Command(UserCommand::Space));
        assert_eq!(app.transcript().text(), "AB  ");

        let effects = app.handle(AppEvent::Command(UserCommand::Clear));
        assert!(effects.contains(&Effect::ClearRemote));
        assert_eq!(app.transcript().display(), "Waiting...");
    }

    #[test]
    fn test_game_match_celebrates_and_schedules() {
        let mut app = app();
        app.handle(AppEvent::Command(UserCommand::Start));
        let target = app.game().target().unwrap();

        let effects = commit(&mut app, target);
        assert!(effects.contains(&Effect::Chime));
        assert!(ui_events(&effects).contains(&&UiEvent::Celebrate { score: 1 }));
        let round = effects
            .iter()
            .find_map(|e| match e {
                Effect::ScheduleRound { round, after } => {
                    assert_eq!(*after, Duration::from_secs(2));
                    Some(*round)
                }
                _ => None,
            })
            .unwrap();

        // Still celebrating: the same sign again does not score
        let effects = commit(&mut app, target);
        assert!(!effects.contains(&Effect::Chime));
        assert_eq!(app.game().score(), 1);

        let effects = app.handle(AppEvent::RoundElapsed(round));
        assert!(matches!(ui_events(&effects).as_slice(), [UiEvent::Target(_)]));
        assert_eq!(app.game().phase(), GamePhase::Awaiting);
    }

    #[test]
    fn test_commit_without_game_only_transcribes() {
        let mut app = app();
        let effects = commit(&mut app, Label::L);
        assert!(!effects.iter().any(|e| matches!(e, Effect::ScheduleRound { .. })));
        assert_eq!(app.game().score(), 0);
    }

    #[test]
    fn test_stop_reports_final_score() {
        let mut app = app();
        let effects = app.handle(AppEvent::Command(UserCommand::Stop));
        assert_eq!(ui_events(&effects), vec![&UiEvent::Message("No game running.".into())]);

        app.handle(AppEvent::Command(UserCommand::Start));
        let target = app.game().target().unwrap();
        commit(&mut app, target);
        let effects = app.handle(AppEvent::Command(UserCommand::Stop));
        assert_eq!(ui_events(&effects), vec![&UiEvent::GameOver { score: 1 }]);
    }

    #[test]
    fn test_playback_ticks_until_done() {
        let mut app = app();
        let effects = app.handle(AppEvent::Command(UserCommand::Play("a b".into())));
        let generation = effects
            .iter()
            .find_map(|e| match e {
                Effect::ScheduleTick { generation, .. } => Some(*generation),
                _ => None,
            })
            .unwrap();

        let mut shown = Vec::new();
        loop {
            let effects = app.handle(AppEvent::PlaybackTick(generation));
            let rescheduled = effects
                .iter()
                .any(|e| matches!(e, Effect::ScheduleTick { .. }));
            shown.extend(ui_events(&effects).into_iter().cloned());
            if !rescheduled {
                break;
            }
        }
        assert_eq!(
            shown,
            vec![
                UiEvent::Glyph {
                    label: Label::A,
                    glyph: "👊"
                },
                UiEvent::PlaybackSpace,
                UiEvent::Glyph {
                    label: Label::B,
                    glyph: "✋"
                },
                UiEvent::PlaybackDone,
            ]
        );
    }

    #[test]
    fn test_play_nothing_playable() {
        let mut app = app();
        let effects = app.handle(AppEvent::Command(UserCommand::Play("123".into())));
        assert!(!effects.iter().any(|e| matches!(e, Effect::ScheduleTick { .. })));
    }

    #[test]
    fn test_speak_and_speed() {
        let mut app = app();
        let effects = app.handle(AppEvent::Command(UserCommand::Speak));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Speak(_))));

        commit(&mut app, Label::V);
        let effects = app.handle(AppEvent::Command(UserCommand::Speak));
        assert!(effects.contains(&Effect::Speak("V".into())));

        let effects = app.handle(AppEvent::Command(UserCommand::Speed(9.0)));
        assert!(effects.contains(&Effect::SetSpeechRate(2.0)));
        assert_eq!(app.status_bar().speech_rate, 2.0);
    }

    #[test]
    fn test_frames_update_status_and_hand() {
        let mut app = app().with_source(false);
        let effects = app.handle(AppEvent::Command(UserCommand::Hand));
        assert_eq!(ui_events(&effects), vec![&UiEvent::Message("No hand tracked yet.".into())]);

        let report = FrameReport {
            hands: vec![hand([true, true, false, false], Handedness::Left, false)],
            predictions: vec![Some(Label::V)],
            commits: vec![],
            elapsed: Duration::from_micros(50),
        };
        app.handle(AppEvent::Recognition(RecognitionEvent::Frame(report)));
        let status = app.status_bar();
        assert_eq!(status.prediction, Some(Label::V));
        assert_eq!(status.hands, 1);
        assert_eq!(status.source, SourceStatus::Tracking);

        let effects = app.handle(AppEvent::Command(UserCommand::Hand));
        match ui_events(&effects).as_slice() {
            [UiEvent::Skeleton(rows)] => {
                assert_eq!(rows.len(), SKELETON_ROWS);
                assert!(rows.iter().any(|r| r.contains('o')));
            }
            other => panic!("unexpected {:?}", other),
        }

        app.handle(AppEvent::Recognition(RecognitionEvent::NoHands));
        assert_eq!(app.status_bar().hands, 0);
        assert_eq!(app.stats().frames, 2);
    }

    #[test]
    fn test_source_end() {
        let mut app = app().with_source(true);
        let effects = app.handle(AppEvent::Recognition(RecognitionEvent::SourceError("boom".into())));
        assert_eq!(app.status_bar().source, SourceStatus::Failed);
        assert!(!effects.contains(&Effect::Quit));

        let effects = app.handle(AppEvent::Recognition(RecognitionEvent::Ended));
        assert!(effects.contains(&Effect::Quit));
        assert_eq!(app.status_bar().source, SourceStatus::Failed);
    }

    #[test]
    fn test_show_respects_atlas() {
        let mut config = Config::default();
        config.playback.letters = vec![Label::A];
        let mut app = App::new(&config);
        let effects = app.handle(AppEvent::Command(UserCommand::Show(Label::A)));
        assert!(matches!(ui_events(&effects).as_slice(), [UiEvent::Glyph { .. }]));
        let effects = app.handle(AppEvent::Command(UserCommand::Show(Label::B)));
        assert!(matches!(ui_events(&effects).as_slice(), [UiEvent::Error(_)]));
    }
}
