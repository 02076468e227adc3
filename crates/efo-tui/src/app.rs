//! Top-level application state and the main event loop.
//!
//! [`App`] owns the [`SearchController`], the [`HierarchyResolver`] and their
//! message receivers. Every tick it drains both receivers, draws, and maps at
//! most one terminal event. A candidate picked in the list is passed through
//! [`SearchController::on_select`] and the result routed to the resolver;
//! the two components never see each other.
//!
//! [`App::run`] sets up the terminal and restores it on exit or panic.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    commands::{Command, CommandError},
    event::{self, AppEvent, Direction},
    theme::Theme,
    widgets::{
        candidate_list::{CandidateList, CandidateListState},
        command_bar::{CommandBar, CommandBarState},
        details::{Details, DetailsState},
        help::HelpPopup,
        search_bar::SearchBar,
        text_input::TextInput,
    },
};
use crossterm::{
    event::{self as ct_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use efo_core::{
    config::Config, Candidate, HierarchyResolver, OntologyLookup, Outcome, ResolveMessage,
    ResolveStatus, SearchController, SearchMessage, SearchStatus,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    text::{Line, Span},
    Frame, Terminal,
};
use tokio::sync::mpsc::UnboundedReceiver;

const POLL: Duration = Duration::from_millis(16);
const MAX_LIST_ROWS: u16 = 10;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Candidates,
    Details,
    /// Vim-style `:` command line is active.
    Command,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub focus: Focus,
    /// Focus before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub config: Config,
    pub show_help: bool,
    pub search_input: TextInput,
    pub candidates: CandidateListState,
    pub details: DetailsState,
    pub command_bar: CommandBarState,
    /// Frame counter driving the spinners.
    pub tick: u64,
    pub quit: bool,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
    client: Arc<dyn OntologyLookup>,
    search: SearchController,
    search_rx: UnboundedReceiver<SearchMessage>,
    resolver: HierarchyResolver,
    resolve_rx: UnboundedReceiver<ResolveMessage>,
}

impl App {
    pub fn new(config: Config, theme: Theme, client: Arc<dyn OntologyLookup>) -> Self {
        let (search, search_rx) = SearchController::new(Arc::clone(&client), config.search.debounce());
        let (resolver, resolve_rx) = HierarchyResolver::new(Arc::clone(&client));

        let state = AppState {
            focus: Focus::Search,
            prev_focus: Focus::Search,
            theme,
            details: DetailsState::new(config.ui.expand_hierarchy),
            config,
            show_help: false,
            search_input: TextInput::default(),
            candidates: CandidateListState::default(),
            command_bar: CommandBarState::default(),
            tick: 0,
            quit: false,
        };

        App { state, client, search, search_rx, resolver, resolve_rx }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn resolver(&self) -> &HierarchyResolver {
        &self.resolver
    }

    /// Set up the terminal, run the event loop, and restore the terminal on
    /// exit. Must be called inside a tokio runtime context.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.drain();
            self.state.tick = self.state.tick.wrapping_add(1);
            terminal.draw(|frame| draw(frame, self))?;

            if self.state.quit {
                break;
            }

            if ct_event::poll(POLL)? {
                match ct_event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        let raw = Event::Key(key);
                        let app_event = if is_insert_mode(self.state.focus) {
                            event::to_app_event_insert(raw)
                        } else {
                            event::to_app_event(raw)
                        };
                        if let Some(ev) = app_event {
                            tracing::debug!(focus = ?self.state.focus, event = ?ev, "key event");
                            self.handle(ev);
                        }
                    }
                    other => {
                        if let Some(ev) = event::to_app_event(other) {
                            self.handle(ev);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply every message the engine components have queued.
    pub fn drain(&mut self) {
        while let Ok(msg) = self.search_rx.try_recv() {
            if self.search.handle(msg) == Outcome::Applied {
                self.state.candidates.reset();
            }
        }
        while let Ok(msg) = self.resolve_rx.try_recv() {
            self.resolver.handle(msg);
        }
    }

    pub fn handle(&mut self, event: AppEvent) {
        if self.state.show_help {
            if matches!(event, AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit) {
                tracing::debug!("help popup closed");
                self.state.show_help = false;
            }
            return;
        }

        if self.state.focus == Focus::Command {
            self.handle_command_bar(event);
            return;
        }

        let in_search = self.state.focus == Focus::Search;
        match event {
            AppEvent::Char('?') if !in_search => {
                tracing::debug!("help popup opened");
                self.state.show_help = true;
            }
            AppEvent::Char(':') if !in_search => {
                tracing::debug!(prev_focus = ?self.state.focus, "entering command mode");
                self.state.prev_focus = self.state.focus;
                self.state.command_bar.clear();
                self.state.focus = Focus::Command;
            }
            AppEvent::Quit => {
                tracing::debug!("quit");
                self.state.quit = true;
            }
            AppEvent::Retry => self.retry(),
            AppEvent::ClearInput => self.clear(),
            AppEvent::SearchFocus => self.focus(Focus::Search),
            AppEvent::FocusNext => {
                let next = match self.state.focus {
                    Focus::Search if self.has_candidates() => Focus::Candidates,
                    Focus::Search | Focus::Candidates => Focus::Details,
                    Focus::Details | Focus::Command => Focus::Search,
                };
                self.focus(next);
            }
            AppEvent::Resize(_, _) => {}
            other => match self.state.focus {
                Focus::Search => self.handle_search(other),
                Focus::Candidates => self.handle_candidates(other),
                Focus::Details => self.state.details.handle(&other),
                Focus::Command => {}
            },
        }
    }

    // -----------------------------------------------------------------------
    // Per-pane handlers
    // -----------------------------------------------------------------------

    fn handle_search(&mut self, event: AppEvent) {
        match event {
            AppEvent::Enter => {
                self.search.submit(self.state.search_input.text.clone());
            }
            AppEvent::Nav(Direction::Down) if self.has_candidates() => {
                self.focus(Focus::Candidates);
            }
            AppEvent::Escape => self.focus(Focus::Details),
            other => {
                if self.state.search_input.handle(&other) {
                    self.search.on_input_change(self.state.search_input.text.clone());
                }
            }
        }
    }

    fn handle_candidates(&mut self, event: AppEvent) {
        let len = self.search.session().candidates.len();
        match event {
            AppEvent::Enter => {
                let picked = self
                    .state
                    .candidates
                    .selected(&self.search.session().candidates)
                    .cloned();
                if picked.is_some() {
                    self.select(picked);
                }
            }
            AppEvent::Nav(Direction::Up) if self.state.candidates.cursor == 0 => {
                self.focus(Focus::Search);
            }
            AppEvent::Escape => self.focus(Focus::Search),
            other => self.state.candidates.handle(&other, len),
        }
    }

    fn handle_command_bar(&mut self, event: AppEvent) {
        match event {
            AppEvent::Escape => {
                tracing::debug!("command bar cancelled");
                self.state.command_bar.clear();
                self.state.focus = self.state.prev_focus;
            }
            AppEvent::Enter => {
                let input = self.state.command_bar.input.text.clone();
                let result = Command::parse(&input).map_err(|e| match e {
                    CommandError::Empty => None,
                    other => Some(other.to_string()),
                });
                let result = match result {
                    Ok(cmd) => {
                        tracing::debug!(command = ?cmd, "executing command");
                        self.execute(cmd).map_err(Some)
                    }
                    Err(e) => Err(e),
                };
                match result {
                    Ok(()) | Err(None) => {
                        self.state.command_bar.clear();
                        if self.state.focus == Focus::Command {
                            self.state.focus = self.state.prev_focus;
                        }
                    }
                    Err(Some(msg)) => self.state.command_bar.error = Some(msg),
                }
            }
            other => self.state.command_bar.handle(&other),
        }
    }

    fn execute(&mut self, cmd: Command) -> Result<(), String> {
        match cmd {
            Command::Quit => self.state.quit = true,
            Command::Help => self.state.show_help = !self.state.show_help,
            Command::Theme(name) => match Theme::by_name(&name) {
                Some(theme) => {
                    tracing::debug!(theme = %theme.name, "theme switched");
                    self.state.theme = theme;
                }
                None => return Err(format!("unknown theme: {name}")),
            },
            Command::Retry => self.retry(),
            Command::Clear => self.clear(),
            Command::Expand => self.state.details.toggle(),
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Engine glue
    // -----------------------------------------------------------------------

    /// Hand a selection from the search controller to the resolver.
    fn select(&mut self, candidate: Option<Candidate>) {
        let picked = self.search.on_select(candidate);
        self.state.candidates.reset();
        match &picked {
            Some(c) => {
                self.state.search_input.set(c.label.clone());
                self.resolver.resolve(&c.label);
                self.state.focus = Focus::Details;
            }
            None => self.resolver.reset(),
        }
        self.state.details.show(picked);
    }

    fn clear(&mut self) {
        self.search.on_clear();
        self.state.search_input.clear();
        self.select(None);
        self.focus(Focus::Search);
    }

    fn retry(&mut self) {
        if self.resolver.session().status == ResolveStatus::Errored {
            self.resolver.retry();
        } else if self.search.session().status == SearchStatus::Errored {
            self.search.retry();
        }
    }

    fn focus(&mut self, next: Focus) {
        tracing::debug!(from = ?self.state.focus, to = ?next, "focus");
        self.state.focus = next;
    }

    fn has_candidates(&self) -> bool {
        !self.search.session().candidates.is_empty()
    }
}

/// Whether alphabetic keys should type rather than trigger shortcuts.
fn is_insert_mode(focus: Focus) -> bool {
    matches!(focus, Focus::Search | Focus::Command)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let s = &app.state;
    let session = app.search.session();
    let list_rows = if session.candidates.is_empty() {
        0
    } else {
        (session.candidates.len() as u16).min(MAX_LIST_ROWS) + 2
    };

    // search bar | candidates | details | hint line
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(list_rows),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(area);

    let spin = s.tick / 5;
    let search_bar = SearchBar::new(
        &s.search_input,
        session,
        app.search.is_busy(),
        spin,
        s.focus == Focus::Search,
        &s.theme,
    );
    let cursor = search_bar.cursor_position(vert[0]);
    frame.render_widget(search_bar, vert[0]);

    if list_rows > 0 {
        frame.render_widget(
            CandidateList::new(&session.candidates, &s.candidates, s.focus == Focus::Candidates, &s.theme),
            vert[1],
        );
    }

    let resolution = app.resolver.session();
    let link = resolution
        .canonical_id
        .as_deref()
        .and_then(|id| app.client.term_page_url(id));
    frame.render_widget(
        Details::new(&s.details, resolution, link, spin, s.focus == Focus::Details, &s.theme),
        vert[2],
    );

    let hint = Line::from(Span::styled(
        " /:search  Tab:focus  Enter:select  Ctrl+r:retry  Ctrl+u:clear  ?:help  q:quit ",
        s.theme.muted,
    ));
    frame.render_widget(hint, vert[3]);

    if s.show_help {
        frame.render_widget(HelpPopup::new(&s.theme), area);
    }

    if s.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom().saturating_sub(1), height: 1, ..area };
        frame.render_widget(CommandBar::new(&s.command_bar, &s.theme), cmd_area);
        frame.set_cursor_position((s.command_bar.cursor_col(cmd_area), cmd_area.y));
        return;
    }

    if s.focus == Focus::Search {
        frame.set_cursor_position(cursor);
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
