//! Remote recognition: poll a companion service that does the recognition itself.
//!
//! The service exposes `GET /status` returning `{"text": "..."}` (its running transcript)
//! and `POST /clear_text`. Letters appended to the service text since the last poll become
//! commits; any other change (a clear, an edit) only moves the baseline.
//!
//! The HTTP side needs the `remote` feature.

#[cfg(feature = "remote")]
use std::time::Duration;

#[cfg(feature = "remote")]
use serde::Deserialize;
use tracing::debug;
#[cfg(feature = "remote")]
use tracing::{info, warn};

#[cfg(feature = "remote")]
use crate::config::RemoteConfig;
#[cfg(feature = "remote")]
use crate::error::Result;
use crate::signs::Label;
#[cfg(feature = "remote")]
use crate::source::{EventSink, RecognitionEvent, RecognitionSource};

#[cfg(feature = "remote")]
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Requests the dispatch loop can make of the remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    ClearText,
}

#[cfg(feature = "remote")]
#[derive(Deserialize)]
struct StatusJson {
    #[serde(default)]
    text: String,
}

/// Tracks the service text and reports what was appended.
#[derive(Debug, Default)]
pub struct TextDiff {
    seen: String,
}

impl TextDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Letters appended since the last update. Non-letters are passed over.
    pub fn update(&mut self, text: &str) -> Vec<Label> {
        let appended: Vec<Label> = match text.strip_prefix(self.seen.as_str()) {
            Some(tail) => tail.chars().filter_map(Label::new).collect(),
            None => {
                debug!(from = %self.seen, to = %text, "remote text rebased");
                Vec::new()
            }
        };
        self.seen.clear();
        self.seen.push_str(text);
        appended
    }

    pub fn seen(&self) -> &str {
        &self.seen
    }
}

#[cfg(feature = "remote")]
/// Blocking HTTP client for the companion service. Must not be used from async code.
pub struct RemoteClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[cfg(feature = "remote")]
impl RemoteClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn status(&self) -> Result<String> {
        let status: StatusJson = self
            .client
            .get(format!("{}/status", self.base_url))
            .send()?
            .error_for_status()?
            .json()?;
        Ok(status.text)
    }

    pub fn clear(&self) -> Result<()> {
        self.client
            .post(format!("{}/clear_text", self.base_url))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(feature = "remote")]
pub struct RemoteSource {
    config: RemoteConfig,
    commands: flume::Receiver<RemoteCommand>,
}

#[cfg(feature = "remote")]
impl RemoteSource {
    pub fn new(config: RemoteConfig, commands: flume::Receiver<RemoteCommand>) -> Self {
        Self { config, commands }
    }

    /// Wait out one poll interval, serving commands as they arrive.
    fn idle(&self, client: &RemoteClient, diff: &mut TextDiff) {
        let deadline = std::time::Instant::now() + Duration::from_millis(self.config.poll_ms);
        loop {
            match self.commands.recv_deadline(deadline) {
                Ok(RemoteCommand::ClearText) => match client.clear() {
                    Ok(()) => {
                        diff.update("");
                    }
                    Err(e) => warn!("remote clear failed: {}", e),
                },
                Err(flume::RecvTimeoutError::Timeout) => return,
                Err(flume::RecvTimeoutError::Disconnected) => {
                    let now = std::time::Instant::now();
                    if deadline > now {
                        std::thread::sleep(deadline - now);
                    }
                    return;
                }
            }
        }
    }
}

#[cfg(feature = "remote")]
impl RecognitionSource for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    fn run(self: Box<Self>, sink: &EventSink) {
        let client = match RemoteClient::new(&self.config.base_url) {
            Ok(client) => client,
            Err(e) => {
                sink.send(RecognitionEvent::SourceError(e.to_string()));
                return;
            }
        };
        info!(url = %self.config.base_url, "polling recognition service");

        let mut diff = TextDiff::new();
        let mut reachable = true;
        while !sink.is_closed() {
            match client.status() {
                Ok(text) => {
                    if !reachable {
                        info!("recognition service reachable again");
                        reachable = true;
                    }
                    for label in diff.update(&text) {
                        if !sink.send(RecognitionEvent::Commit(label)) {
                            return;
                        }
                    }
                }
                Err(e) if reachable => {
                    reachable = false;
                    if !sink.send(RecognitionEvent::SourceError(e.to_string())) {
                        return;
                    }
                }
                Err(e) => debug!("recognition service still unreachable: {}", e),
            }
            self.idle(&client, &mut diff);
        }
    }
}
