//! Slash-command entry point
//!
//! `/sma` opens the mode picker. A mode keyword after it (`/sma translate`,
//! `/sma style tone`) opens the picker and selects that mode in one step.

use crate::model::{Mode, UnknownMode};
use crate::state_machine::Event;
use thiserror::Error;

pub const COMMAND: &str = "/sma";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Not an assistant command; type /sma to start")]
    NotACommand,
    #[error(transparent)]
    UnknownMode(#[from] UnknownMode),
}

impl CommandError {
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::NotACommand => "not_a_command",
            CommandError::UnknownMode(_) => "unknown_mode",
        }
    }
}

/// What a parsed command asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Picker,
    Mode(Mode),
}

impl Invocation {
    /// Triggers to apply, in order
    pub fn events(self) -> Vec<Event> {
        match self {
            Invocation::Picker => vec![Event::OpenPicker],
            Invocation::Mode(mode) => vec![Event::OpenPicker, Event::SelectMode { mode }],
        }
    }
}

pub fn parse(text: &str) -> Result<Invocation, CommandError> {
    let mut words = text.split_whitespace();
    match words.next() {
        Some(word) if word.eq_ignore_ascii_case(COMMAND) => {}
        _ => return Err(CommandError::NotACommand),
    }

    let rest: Vec<&str> = words.collect();
    if rest.is_empty() {
        return Ok(Invocation::Picker);
    }
    Ok(Invocation::Mode(rest.join("_").parse()?))
}
