// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

use thiserror::Error;

use crate::theme::THEME_NAMES;

/// A parsed, validated `:` command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Theme(String),
    /// Re-run whichever lookup last failed.
    Retry,
    /// Empty the search box and drop the selection.
    Clear,
    /// Toggle the hierarchy list in the details pane.
    Expand,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank input; the bar closes without acting.
    #[error("")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(String),
}

impl Command {
    /// Parse the text typed after the `:` prefix.
    pub fn parse(input: &str) -> Result<Command, CommandError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CommandError::Empty);
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" | "q!" => Ok(Command::Quit),
            "help" | "h" => Ok(Command::Help),
            "retry" | "r" => Ok(Command::Retry),
            "clear" => Ok(Command::Clear),
            "expand" | "e" => Ok(Command::Expand),
            "theme" => {
                if rest.is_empty() {
                    Err(CommandError::Usage(format!("theme <{}>", THEME_NAMES.join("|"))))
                } else {
                    Ok(Command::Theme(rest.to_string()))
                }
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
