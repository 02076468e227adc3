//! Ratatui widgets for the efo-explorer TUI.

pub mod candidate_list;
pub mod command_bar;
pub mod details;
pub mod help;
pub mod search_bar;
pub mod text_input;

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner glyph for the given UI tick.
pub fn spinner(tick: u64) -> &'static str {
    SPINNER[(tick as usize) % SPINNER.len()]
}
