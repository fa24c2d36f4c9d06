//! Errors raised at the crate's boundaries (config, landmark input, speech, remote service).
//!
//! Recognition itself never fails: a missing hand or an unknown gesture is an absence of
//! signal, not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed landmark frame: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("speech output failed: {0}")]
    Speech(String),

    #[cfg(feature = "remote")]
    #[error("recognition service request failed: {0}")]
    Remote(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
