//! Search bar — the disease-name input at the top of the screen.
//!
//! Shows the typed text, a spinner while a lookup is pending, and the
//! session's error message on the bottom border.

use crate::theme::Theme;
use crate::widgets::{spinner, text_input::TextInput};
use efo_core::{SearchSession, SearchStatus};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

const PLACEHOLDER: &str = "type a disease name, e.g. asthma";

pub struct SearchBar<'a> {
    input: &'a TextInput,
    session: &'a SearchSession,
    busy: bool,
    tick: u64,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> SearchBar<'a> {
    pub fn new(
        input: &'a TextInput,
        session: &'a SearchSession,
        busy: bool,
        tick: u64,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { input, session, busy, tick, focused, theme }
    }

    /// Absolute terminal position of the text cursor. Pass to
    /// `frame.set_cursor_position()` after rendering.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let x = (area.x + 1 + self.input.cursor_chars()).min(area.right().saturating_sub(2));
        (x, area.y + 1)
    }
}

impl Widget for SearchBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::bordered()
            .title(Line::styled(" Search disease ", self.theme.title))
            .border_style(self.theme.border(self.focused));

        if self.session.status == SearchStatus::Errored {
            if let Some(msg) = self.session.error_message() {
                block = block.title_bottom(Line::styled(format!(" {msg} "), self.theme.error));
            }
        }

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(LayoutDir::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(14)])
            .split(inner);

        let text = if self.input.text.is_empty() && !self.focused {
            Line::from(Span::styled(PLACEHOLDER, self.theme.muted))
        } else {
            Line::from(self.input.text.as_str())
        };
        Paragraph::new(text).render(chunks[0], buf);

        let status = if self.busy {
            Line::from(Span::styled(
                format!("{} searching", spinner(self.tick)),
                self.theme.accent,
            ))
        } else if self.session.status == SearchStatus::Settled {
            Line::from(Span::styled(
                format!("{} found", self.session.candidates.len()),
                self.theme.muted,
            ))
        } else {
            Line::default()
        };
        Paragraph::new(status.right_aligned()).render(chunks[1], buf);
    }
}
