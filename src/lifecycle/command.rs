// src/lifecycle/command.rs
use std::time::Duration;

use crate::config::parse_duration;

/// Optional positional subcommand given after the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Block, then exit with the configured exit code.
    Sleep(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown subcommand: {0}")]
    Unknown(String),

    #[error("sleep requires duration")]
    MissingDuration,

    #[error("sleep requires duration: {0}")]
    InvalidDuration(#[from] humantime::DurationError),
}

impl Command {
    /// `Ok(None)` when no subcommand was given.
    pub fn parse(args: &[String]) -> Result<Option<Self>, CommandError> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(None);
        };

        match name.as_str() {
            "sleep" => {
                let raw = rest.first().ok_or(CommandError::MissingDuration)?;
                Ok(Some(Command::Sleep(parse_duration(raw)?)))
            }
            other => Err(CommandError::Unknown(other.to_owned())),
        }
    }
}
