//! Scripted in-memory [`OntologyLookup`] for unit tests.
//!
//! Responses are registered per term; each may carry a delay so tests can
//! make an older request land after a newer one under `start_paused` time.
//! Every call is recorded.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LookupError;
use crate::lookup::OntologyLookup;
use crate::types::{AncestorRecord, LookupKey, SearchHit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    Exact(String),
    Ancestors(String),
}

type Scripted<T> = (Duration, Result<T, LookupError>);

#[derive(Default)]
pub struct ScriptedLookup {
    search: Mutex<HashMap<String, Scripted<Vec<SearchHit>>>>,
    exact: Mutex<HashMap<String, Scripted<Option<SearchHit>>>>,
    ancestors: Mutex<HashMap<String, Scripted<Vec<AncestorRecord>>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_search(self, term: &str, hits: Vec<SearchHit>) -> Self {
        self.on_search_after(term, Duration::ZERO, Ok(hits))
    }

    pub fn on_search_after(
        self,
        term: &str,
        delay: Duration,
        outcome: Result<Vec<SearchHit>, LookupError>,
    ) -> Self {
        self.search.lock().unwrap().insert(term.to_string(), (delay, outcome));
        self
    }

    pub fn on_exact(self, label: &str, hit: Option<SearchHit>) -> Self {
        self.on_exact_after(label, Duration::ZERO, Ok(hit))
    }

    pub fn on_exact_after(
        self,
        label: &str,
        delay: Duration,
        outcome: Result<Option<SearchHit>, LookupError>,
    ) -> Self {
        self.exact.lock().unwrap().insert(label.to_string(), (delay, outcome));
        self
    }

    pub fn on_ancestors(self, key: &str, records: Vec<AncestorRecord>) -> Self {
        self.on_ancestors_after(key, Duration::ZERO, Ok(records))
    }

    pub fn on_ancestors_after(
        self,
        key: &str,
        delay: Duration,
        outcome: Result<Vec<AncestorRecord>, LookupError>,
    ) -> Self {
        self.ancestors.lock().unwrap().insert(key.to_string(), (delay, outcome));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

async fn play<T: Clone + Default>(
    table: &Mutex<HashMap<String, Scripted<T>>>,
    key: &str,
) -> Result<T, LookupError> {
    let entry = table.lock().unwrap().get(key).cloned();
    match entry {
        Some((delay, outcome)) => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome
        }
        None => Ok(T::default()),
    }
}

#[async_trait]
impl OntologyLookup for ScriptedLookup {
    async fn search_candidates(&self, term: &str) -> Result<Vec<SearchHit>, LookupError> {
        self.calls.lock().unwrap().push(Call::Search(term.to_string()));
        play(&self.search, term).await
    }

    async fn find_exact(&self, label: &str) -> Result<Option<SearchHit>, LookupError> {
        self.calls.lock().unwrap().push(Call::Exact(label.to_string()));
        play(&self.exact, label).await
    }

    async fn fetch_ancestors(&self, key: &LookupKey) -> Result<Vec<AncestorRecord>, LookupError> {
        self.calls.lock().unwrap().push(Call::Ancestors(key.as_str().to_string()));
        play(&self.ancestors, key.as_str()).await
    }
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

pub fn hit(label: &str) -> SearchHit {
    let short = label.replace(' ', "_");
    SearchHit {
        id: Some(format!("efo:class:{short}")),
        label: Some(label.to_string()),
        description: vec![format!("{label} description")],
        iri: Some(format!("http://www.ebi.ac.uk/efo/{short}")),
        obo_id: None,
        short_form: Some(short),
    }
}

pub fn canonical(label: &str, short_form: &str) -> SearchHit {
    SearchHit {
        id: Some(format!("efo:class:{short_form}")),
        label: Some(label.to_string()),
        description: Vec::new(),
        iri: Some(format!("http://www.ebi.ac.uk/efo/{short_form}")),
        obo_id: Some(short_form.replacen('_', ":", 1)),
        short_form: Some(short_form.to_string()),
    }
}

pub fn ancestor(short_form: &str, label: &str) -> AncestorRecord {
    AncestorRecord {
        iri: Some(format!("http://www.ebi.ac.uk/efo/{short_form}")),
        label: Some(label.to_string()),
        description: Vec::new(),
        obo_id: Some(short_form.replacen('_', ":", 1)),
    }
}

pub fn transport_error() -> LookupError {
    LookupError::Transport("connection reset by peer".to_string())
}
