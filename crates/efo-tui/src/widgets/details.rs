//! Details pane — the selected disease, its canonical id and its ancestors.
//!
//! The ancestor list is collapsed by default (or per `[ui] expand_hierarchy`)
//! and toggled with `Enter`/`→` while the pane is focused.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use crate::widgets::spinner;
use efo_core::{Candidate, HierarchyTerm, ResolutionSession, ResolveStatus};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

pub const NO_HIERARCHY: &str = "No hierarchy information available.";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DetailsState {
    /// The candidate whose details are shown.
    pub selected: Option<Candidate>,
    pub expanded: bool,
    /// First visible line.
    pub scroll: u16,
}

impl DetailsState {
    pub fn new(expanded: bool) -> Self {
        Self { expanded, ..Self::default() }
    }

    pub fn show(&mut self, candidate: Option<Candidate>) {
        self.selected = candidate;
        self.scroll = 0;
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
        tracing::debug!(expanded = self.expanded, "details: hierarchy toggled");
    }

    pub fn handle(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Enter | AppEvent::Nav(Direction::Right) | AppEvent::Nav(Direction::Left) => {
                self.toggle()
            }
            AppEvent::Nav(Direction::Up) => self.scroll = self.scroll.saturating_sub(1),
            AppEvent::Nav(Direction::Down) => self.scroll = self.scroll.saturating_add(1),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct Details<'a> {
    state: &'a DetailsState,
    resolution: &'a ResolutionSession,
    /// Browser link for the canonical id, if the lookup client provides one.
    link: Option<String>,
    tick: u64,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> Details<'a> {
    pub fn new(
        state: &'a DetailsState,
        resolution: &'a ResolutionSession,
        link: Option<String>,
        tick: u64,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { state, resolution, link, tick, focused, theme }
    }

    /// Lines the pane renders, before wrapping.
    pub fn lines(&self) -> Vec<Line<'static>> {
        let t = self.theme;
        let Some(candidate) = &self.state.selected else {
            return vec![Line::styled("Select a candidate to see its details.", t.muted)];
        };

        let mut lines = vec![Line::styled(candidate.label.clone(), t.title)];
        if let Some(desc) = &candidate.description {
            lines.push(Line::raw(desc.clone()));
        }
        lines.push(Line::default());

        let r = self.resolution;
        if let Some(id) = &r.canonical_id {
            let mut spans = vec![Span::styled("EFO ID: ", t.muted), Span::raw(id.clone())];
            if let Some(link) = &self.link {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(link.clone(), t.link));
            }
            lines.push(Line::from(spans));
        }

        match r.status {
            ResolveStatus::Idle => {}
            ResolveStatus::ResolvingCanonical | ResolveStatus::ResolvingHierarchy => {
                lines.push(Line::styled(
                    format!("{} resolving hierarchy…", spinner(self.tick)),
                    t.accent,
                ));
            }
            ResolveStatus::Errored => {
                if let Some(msg) = r.error_message() {
                    lines.push(Line::styled(msg, t.error));
                    if r.error.as_ref().is_some_and(|e| e.is_retryable()) {
                        lines.push(Line::styled("Ctrl+r to retry", t.muted));
                    }
                }
            }
            ResolveStatus::Done => {
                lines.push(Line::default());
                lines.extend(hierarchy_lines(&r.ancestors, self.state.expanded, t));
            }
        }
        lines
    }
}

fn hierarchy_lines(ancestors: &[HierarchyTerm], expanded: bool, t: &Theme) -> Vec<Line<'static>> {
    if ancestors.is_empty() {
        return vec![Line::styled(NO_HIERARCHY, t.muted)];
    }

    let toggle = if expanded { "[-] hide" } else { "[+] show" };
    let mut lines = vec![Line::from(vec![
        Span::styled("Hierarchy ", t.title),
        Span::styled(format!("({})", ancestors.len()), t.accent),
        Span::styled(format!("  {toggle}"), t.muted),
    ])];
    if !expanded {
        return lines;
    }

    for term in ancestors {
        let mut spans = vec![Span::raw("• "), Span::raw(term.label.clone())];
        if let Some(obo) = &term.obo_id {
            spans.push(Span::styled(format!(" ({obo})"), t.muted));
        }
        lines.push(Line::from(spans));
        if let Some(first) = term.description.as_deref().and_then(|d| d.lines().next()) {
            lines.push(Line::styled(format!("    {first}"), t.muted));
        }
    }
    lines
}

impl Widget for Details<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(Line::styled(" Disease details ", self.theme.title))
            .border_style(self.theme.border(self.focused));

        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.state.scroll, 0))
            .render(area, buf);
    }
}
