//! Hand-sign recognition, text-to-sign playback and a sign practice game.
//!
//! Landmark frames from an external hand tracker are classified into letters, debounced,
//! and accumulated into a transcript. Typed text is played back as sign glyphs.

pub mod app;
pub mod classifier;
pub mod command;
pub mod config;
pub mod error;
pub mod game;
pub mod landmark;
pub mod playback;
pub mod recognizer;
pub mod remote;
pub mod render;
pub mod signs;
pub mod skeleton;
pub mod source;
pub mod speech;
pub mod stability;
pub mod stats;
pub mod status_bar;
pub mod transcript;

pub use error::{Error, Result};
