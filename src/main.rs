use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use signtutor::app::{self, App, SessionIo};
use signtutor::config::Config;
use signtutor::playback::{Playback, PlaybackStep};
use signtutor::render::{Renderer, Ui, UiEvent};
use signtutor::source::{self, LandmarkPipeline, RecognitionSource, ReplaySource, TrackerSource};
use signtutor::speech::Speech;

#[derive(Parser)]
#[command(name = "signtutor", version, about)]
struct Cli {
    /// Config file (default: ./config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Recognize signs from recorded landmark frames (JSON lines)
    Replay {
        file: PathBuf,
        /// Frames per second; 0 replays as fast as possible
        #[arg(long)]
        fps: Option<u32>,
        /// Quit when the recording ends
        #[arg(long)]
        exit: bool,
    },
    /// Run a hand tracker and recognize signs from its stdout
    Track {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Follow the transcript of a remote recognition service
    #[cfg(feature = "remote")]
    Remote {
        /// Service base URL (default from config)
        #[arg(long)]
        url: Option<String>,
    },
    /// Play the signs for a text, then exit
    Translate {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print every letter with its sign
    Atlas,
}

fn init_tracing() {
    // Logs go to stderr so they never interleave with the status line on stdout
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn term_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(80)
}

#[hotpath::main]
fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().context("failed to load config.toml")?,
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli.command, config))
}

async fn async_main(command: Option<Command>, config: Config) -> anyhow::Result<()> {
    let mut remote_tx = None;
    let mut quit_on_end = false;

    let source: Option<Box<dyn RecognitionSource>> = match command {
        Some(Command::Atlas) => {
            println!("{}", config.playback.atlas().listing(7));
            return Ok(());
        }
        Some(Command::Translate { text }) => {
            return run_translate(&text.join(" "), &config).await;
        }
        Some(Command::Replay { file, fps, exit }) => {
            quit_on_end = exit;
            let fps = fps.unwrap_or(config.tracker.replay_fps);
            Some(Box::new(ReplaySource::new(
                file,
                fps,
                LandmarkPipeline::from_config(&config),
            )))
        }
        Some(Command::Track { command }) => {
            let (program, args) = command
                .split_first()
                .context("tracker command is empty")?;
            Some(Box::new(TrackerSource::new(
                program.clone(),
                args.to_vec(),
                config.tracker.clone(),
                LandmarkPipeline::from_config(&config),
            )))
        }
        #[cfg(feature = "remote")]
        Some(Command::Remote { url }) => {
            let mut remote = config.remote.clone();
            if let Some(url) = url {
                remote.base_url = url;
            }
            let (tx, rx) = flume::unbounded();
            remote_tx = Some(tx);
            Some(Box::new(signtutor::remote::RemoteSource::new(remote, rx)))
        }
        None => None,
    };

    let recognition = match source {
        Some(source) => {
            let (tx, rx) = source::channel();
            source::spawn(source, tx).context("failed to start recognition source")?;
            Some(rx)
        }
        None => None,
    };

    let (ui, ui_rx) = Ui::new();
    let mut renderer = Renderer::new();
    tokio::spawn(async move {
        renderer.set_term_width(term_width());
        while let Ok(event) = ui_rx.recv_async().await {
            // Follow terminal resizes at spinner rate
            if event == UiEvent::Tick {
                renderer.set_term_width(term_width());
            }
            renderer.handle(event);
        }
    });

    // Animation tick for the status spinner
    let ui_tick = ui.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        loop {
            interval.tick().await;
            ui_tick.tick();
        }
    });

    let (input_tx, input_rx) = flume::unbounded::<String>();
    let ctrlc_tx = input_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send("/quit".to_string());
    })?;

    // Readline thread
    let interactive_only = recognition.is_none();
    thread::spawn(move || {
        use rustyline::DefaultEditor;
        use rustyline::error::ReadlineError;

        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::warn!("readline unavailable: {}", e);
                return;
            }
        };

        loop {
            match rl.readline("> ") {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = rl.add_history_entry(&line);
                    }
                    if input_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    let _ = input_tx.send("/quit".to_string());
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Without a source there is nothing left to do
                    if interactive_only {
                        let _ = input_tx.send("/quit".to_string());
                    }
                    break;
                }
                Err(e) => {
                    tracing::warn!("readline error: {}", e);
                    break;
                }
            }
        }
    });

    println!("signtutor: sign letters to the camera, type /help for commands.\n");

    let mut app = App::new(&config);
    if recognition.is_some() {
        app = app.with_source(quit_on_end);
    }
    let io = SessionIo {
        ui: ui.clone(),
        speech: Speech::from_config(&config.speech),
        input: Some(input_rx),
        recognition,
        remote: remote_tx,
    };
    let app = app::run(app, io).await;

    // Let the renderer drain before the final report
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("\nTranscript: {}", app.transcript().display());
    print!("{}", app.stats().summary());
    Ok(())
}

async fn run_translate(text: &str, config: &Config) -> anyhow::Result<()> {
    let mut playback = Playback::new(config.playback.atlas());
    let Some(generation) = playback.start(text) else {
        anyhow::bail!("nothing to play in {:?} (letters A-Z only)", text);
    };

    let mut renderer = Renderer::new();
    renderer.set_term_width(term_width());
    let mut interval = tokio::time::interval(config.playback.tick());
    interval.tick().await;
    loop {
        interval.tick().await;
        let Some(step) = playback.tick(generation) else {
            break;
        };
        let event = match step {
            PlaybackStep::Glyph { label, glyph } => UiEvent::Glyph { label, glyph },
            PlaybackStep::Space => UiEvent::PlaybackSpace,
            PlaybackStep::Done => {
                renderer.handle(UiEvent::PlaybackDone);
                break;
            }
        };
        renderer.handle(event);
    }
    println!();
    Ok(())
}
