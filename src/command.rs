//! Slash commands typed at the prompt.
//!
//! A line starting with `/` is a command; any other non-empty line is text to play back
//! as signs.

use crate::signs::Label;

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Start (or restart) the practice game
    Start,
    /// End the practice game
    Stop,
    Clear,
    Space,
    Speak,
    Speed(f32),
    Play(String),
    Show(Label),
    Atlas,
    /// Draw the most recent hand skeleton
    Hand,
    Status,
    Stats,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  /start - Start the practice game (resets the score)
  /stop - End the practice game
  /clear - Clear the transcript
  /space - Add a space to the transcript
  /speak - Read the transcript aloud
  /speed <0.5-2.0> - Set the speech rate
  /play <text> - Show the signs for <text>, one per tick
  /show <letter> - Show the sign for one letter
  /atlas - List every letter with its sign
  /hand - Draw the last tracked hand
  /status - Show game and source status
  /stats - Show recognition stats
  /quit - Exit application
  /help or /commands - Show this help

Any other text is played back as signs.";

/// Parse one input line. `Ok(None)` for a blank line; `Err` carries a message for the user.
pub fn parse(input: &str) -> Result<Option<UserCommand>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let Some(rest) = input.strip_prefix('/') else {
        return Ok(Some(UserCommand::Play(input.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "start" => UserCommand::Start,
        "stop" => UserCommand::Stop,
        "clear" => UserCommand::Clear,
        "space" => UserCommand::Space,
        "speak" | "say" => UserCommand::Speak,
        "speed" | "rate" => {
            let rate = arg
                .parse::<f32>()
                .ok()
                .filter(|r| r.is_finite())
                .ok_or_else(|| format!("Usage: /speed <0.5-2.0> (got '{}')", arg))?;
            UserCommand::Speed(rate)
        }
        "play" => {
            if arg.is_empty() {
                return Err("Usage: /play <text>".to_string());
            }
            UserCommand::Play(arg.to_string())
        }
        "show" => {
            let mut chars = arg.chars();
            match (chars.next().and_then(Label::new), chars.next()) {
                (Some(label), None) => UserCommand::Show(label),
                _ => return Err("Usage: /show <letter>".to_string()),
            }
        }
        "atlas" => UserCommand::Atlas,
        "hand" => UserCommand::Hand,
        "status" => UserCommand::Status,
        "stats" => UserCommand::Stats,
        "help" | "commands" => UserCommand::Help,
        "quit" | "exit" => UserCommand::Quit,
        _ => return Err(format!("Unknown command /{}. Type /help for commands.", name)),
    };
    Ok(Some(command))
}
