//! Incremental search — debounced lookups that settle into a candidate list.
//!
//! [`SearchController`] owns one [`SearchSession`]. Keystrokes go through
//! [`SearchController::on_input_change`], which records the text and
//! (re)starts the debounce timer. Timer fires and lookup replies arrive as
//! [`SearchMessage`]s on the channel returned by [`SearchController::new`];
//! the owner passes each one back to [`SearchController::handle`].
//!
//! # Staleness
//!
//! Every lookup is tagged with the session generation current when it was
//! issued. A reply whose tag no longer matches is dropped before it can touch
//! the session, regardless of when it arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::debounce::{Debouncer, Generation};
use crate::error::{EngineError, LookupError, Stage};
use crate::lookup::OntologyLookup;
use crate::types::{Candidate, SearchHit};
use crate::Outcome;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchStatus {
    #[default]
    Idle,
    Pending,
    Settled,
    Errored,
}

/// Transient state of the current search.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    /// Raw text as typed, shown in the input box.
    pub input: String,
    /// Trimmed text of the most recent lookup.
    pub query: String,
    pub status: SearchStatus,
    /// Candidates in service order.
    pub candidates: Vec<Candidate>,
    pub error: Option<EngineError>,
    pub generation: Generation,
}

impl SearchSession {
    /// User-facing error text, if the session is errored.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Work reported back to the controller's owner.
#[derive(Debug)]
pub enum SearchMessage {
    /// The debounce quiet period elapsed.
    Settled { ticket: u64 },
    /// A lookup finished.
    Completed {
        generation: u64,
        query: String,
        outcome: Result<Vec<SearchHit>, LookupError>,
    },
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

type SelectHook = Box<dyn FnMut(Option<&Candidate>) + Send>;

pub struct SearchController {
    client: Arc<dyn OntologyLookup>,
    debouncer: Debouncer,
    session: SearchSession,
    tx: UnboundedSender<SearchMessage>,
    on_select: Option<SelectHook>,
}

impl SearchController {
    /// Create a controller and the receiver its messages arrive on.
    pub fn new(
        client: Arc<dyn OntologyLookup>,
        debounce: Duration,
    ) -> (Self, UnboundedReceiver<SearchMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            client,
            debouncer: Debouncer::new(debounce),
            session: SearchSession::default(),
            tx,
            on_select: None,
        };
        (controller, rx)
    }

    /// Register the downstream consumer of [`SearchController::on_select`].
    pub fn with_on_select<F>(mut self, hook: F) -> Self
    where
        F: FnMut(Option<&Candidate>) + Send + 'static,
    {
        self.on_select = Some(Box::new(hook));
        self
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// True while a timer is pending or the current lookup is in flight.
    pub fn is_busy(&self) -> bool {
        self.debouncer.is_pending() || self.session.status == SearchStatus::Pending
    }

    /// Record `text` and restart the debounce timer.
    pub fn on_input_change(&mut self, text: impl Into<String>) {
        self.session.input = text.into();
        let ticket = self
            .debouncer
            .schedule(&self.tx, |ticket| SearchMessage::Settled { ticket });
        tracing::debug!(input = %self.session.input, ticket, "search: input changed");
    }

    /// Look up `text` right away, skipping the quiet period.
    pub fn submit(&mut self, text: impl Into<String>) -> Outcome {
        self.session.input = text.into();
        self.debouncer.cancel();
        self.evaluate()
    }

    /// Re-issue the lookup for the current input under a fresh generation.
    pub fn retry(&mut self) -> Outcome {
        let input = self.session.input.clone();
        tracing::debug!(input = %input, "search: retry");
        self.submit(input)
    }

    /// Close the candidate list and forward the selection.
    ///
    /// A concrete selection becomes the displayed text without triggering a
    /// new lookup. In-flight lookups are superseded so a late reply cannot
    /// reopen the list.
    pub fn on_select(&mut self, candidate: Option<Candidate>) -> Option<Candidate> {
        self.debouncer.cancel();
        self.session.generation.advance();
        self.session.candidates.clear();
        self.session.error = None;
        self.session.status = SearchStatus::Idle;
        if let Some(c) = &candidate {
            self.session.input = c.label.clone();
            self.session.query = c.label.clone();
        }
        tracing::debug!(selected = ?candidate.as_ref().map(|c| &c.label), "search: selection");
        if let Some(hook) = self.on_select.as_mut() {
            hook(candidate.as_ref());
        }
        candidate
    }

    /// Drop everything and return to `Idle`.
    pub fn on_clear(&mut self) {
        self.debouncer.cancel();
        let generation = self.session.generation;
        self.session = SearchSession { generation, ..SearchSession::default() };
        self.session.generation.advance();
        tracing::debug!("search: cleared");
    }

    /// Apply a message received from the controller's channel.
    pub fn handle(&mut self, message: SearchMessage) -> Outcome {
        match message {
            SearchMessage::Settled { ticket } => {
                if !self.debouncer.fire(ticket) {
                    tracing::debug!(ticket, "search: stale timer ignored");
                    return Outcome::Superseded;
                }
                self.evaluate()
            }
            SearchMessage::Completed { generation, query, outcome } => {
                self.complete(generation, query, outcome)
            }
        }
    }

    /// Receive and apply messages until the controller is no longer busy.
    pub async fn settle(&mut self, rx: &mut UnboundedReceiver<SearchMessage>) {
        while self.is_busy() {
            match rx.recv().await {
                Some(message) => {
                    self.handle(message);
                }
                None => break,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn evaluate(&mut self) -> Outcome {
        let query = self.session.input.trim().to_string();
        if query.is_empty() {
            self.session.generation.advance();
            self.session.query.clear();
            self.session.candidates.clear();
            self.session.error = None;
            self.session.status = SearchStatus::Idle;
            tracing::debug!("search: empty input, no lookup");
            return Outcome::Skipped;
        }

        let generation = self.session.generation.advance();
        self.session.query = query.clone();
        self.session.status = SearchStatus::Pending;
        self.session.error = None;
        tracing::debug!(query = %query, generation, "search: lookup issued");

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = client.search_candidates(&query).await;
            let _ = tx.send(SearchMessage::Completed { generation, query, outcome });
        });
        Outcome::Applied
    }

    fn complete(
        &mut self,
        generation: u64,
        query: String,
        outcome: Result<Vec<SearchHit>, LookupError>,
    ) -> Outcome {
        if !self.session.generation.is_current(generation) {
            tracing::debug!(
                query = %query,
                generation,
                current = %self.session.generation,
                "search: superseded reply dropped"
            );
            return Outcome::Superseded;
        }

        match outcome {
            Ok(hits) => {
                let candidates = candidates_from_hits(&hits);
                tracing::debug!(
                    query = %query,
                    hits = hits.len(),
                    candidates = candidates.len(),
                    "search: settled"
                );
                if candidates.is_empty() {
                    self.session.candidates.clear();
                    self.session.error = Some(EngineError::NoMatches);
                    self.session.status = SearchStatus::Errored;
                } else {
                    self.session.candidates = candidates;
                    self.session.error = None;
                    self.session.status = SearchStatus::Settled;
                }
            }
            Err(err) => {
                tracing::warn!(query = %query, error = %err, "search: lookup failed");
                self.session.candidates.clear();
                self.session.error = Some(EngineError::lookup(Stage::Search, err));
                self.session.status = SearchStatus::Errored;
            }
        }
        Outcome::Applied
    }
}

/// Map raw hits to candidates, dropping unusable ones and keeping order.
pub fn candidates_from_hits(hits: &[SearchHit]) -> Vec<Candidate> {
    hits.iter().filter_map(Candidate::from_hit).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
