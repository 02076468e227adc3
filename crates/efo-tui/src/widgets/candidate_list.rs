//! Candidate list — the dropdown of search results under the search bar.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use efo_core::Candidate;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CandidateListState {
    pub cursor: usize,
}

impl CandidateListState {
    /// Move the cursor within a list of `len` items.
    pub fn handle(&mut self, event: &AppEvent, len: usize) {
        match event {
            AppEvent::Nav(Direction::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            AppEvent::Nav(Direction::Down) => {
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
            }
            _ => {}
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn selected<'c>(&self, candidates: &'c [Candidate]) -> Option<&'c Candidate> {
        candidates.get(self.cursor)
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct CandidateList<'a> {
    candidates: &'a [Candidate],
    state: &'a CandidateListState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> CandidateList<'a> {
    pub fn new(
        candidates: &'a [Candidate],
        state: &'a CandidateListState,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { candidates, state, focused, theme }
    }
}

impl Widget for CandidateList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(Line::styled(" Candidates ", self.theme.title))
            .border_style(self.theme.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.candidates.is_empty() {
            Paragraph::new(Line::styled("no candidates", self.theme.muted)).render(inner, buf);
            return;
        }

        let width = inner.width as usize;
        let items: Vec<ListItem> = self
            .candidates
            .iter()
            .map(|c| {
                let mut spans = vec![Span::raw(c.label.clone())];
                if let Some(desc) = &c.description {
                    let room = width.saturating_sub(c.label.chars().count() + 3);
                    if room > 8 {
                        spans.push(Span::styled(
                            format!(" — {}", truncate(desc, room)),
                            self.theme.muted,
                        ));
                    }
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items).highlight_style(self.theme.list_highlight);
        let selected = self.focused.then_some(self.state.cursor);
        let mut list_state = ListState::default().with_selected(selected);
        StatefulWidget::render(list, inner, buf, &mut list_state);
    }
}

/// Cut `s` to at most `max` characters, ending in `…` when shortened.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
