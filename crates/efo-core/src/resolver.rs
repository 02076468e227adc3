//! Two-stage hierarchy resolution for a selected term.
//!
//! ```text
//! Idle ──resolve──► ResolvingCanonical ──hit──► ResolvingHierarchy ──► Done
//!                          │                          │
//!                          └────────► Errored ◄───────┘
//! ```
//!
//! Each call to [`HierarchyResolver::resolve`] opens a new session and
//! abandons the previous one. Stage replies carry the session id they were
//! issued under; replies for any other session are dropped in
//! [`HierarchyResolver::handle`].

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::debounce::Generation;
use crate::error::{EngineError, LookupError, Stage};
use crate::lookup::OntologyLookup;
use crate::types::{AncestorRecord, HierarchyTerm, LookupKey, SearchHit};
use crate::Outcome;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolveStatus {
    #[default]
    Idle,
    ResolvingCanonical,
    ResolvingHierarchy,
    Done,
    Errored,
}

impl ResolveStatus {
    pub fn is_resolving(self) -> bool {
        matches!(self, Self::ResolvingCanonical | Self::ResolvingHierarchy)
    }
}

/// State of one resolution, replaced wholesale by the next.
#[derive(Debug, Clone, Default)]
pub struct ResolutionSession {
    pub session: Generation,
    pub subject_label: String,
    /// `obo_id` of the canonical hit, else its IRI.
    pub canonical_id: Option<String>,
    pub lookup_key: Option<LookupKey>,
    /// Ancestors in service order, unique by IRI.
    pub ancestors: Vec<HierarchyTerm>,
    pub status: ResolveStatus,
    pub error: Option<EngineError>,
}

impl ResolutionSession {
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

#[derive(Debug)]
pub enum ResolveMessage {
    Canonical {
        session: u64,
        outcome: Result<Option<SearchHit>, LookupError>,
    },
    Ancestors {
        session: u64,
        outcome: Result<Vec<AncestorRecord>, LookupError>,
    },
}

impl ResolveMessage {
    fn session(&self) -> u64 {
        match self {
            Self::Canonical { session, .. } | Self::Ancestors { session, .. } => *session,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

pub struct HierarchyResolver {
    client: Arc<dyn OntologyLookup>,
    session: ResolutionSession,
    tx: UnboundedSender<ResolveMessage>,
}

impl HierarchyResolver {
    pub fn new(client: Arc<dyn OntologyLookup>) -> (Self, UnboundedReceiver<ResolveMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let resolver = Self {
            client,
            session: ResolutionSession::default(),
            tx,
        };
        (resolver, rx)
    }

    pub fn session(&self) -> &ResolutionSession {
        &self.session
    }

    pub fn is_busy(&self) -> bool {
        self.session.status.is_resolving()
    }

    /// Start resolving `label`, abandoning whatever was in progress.
    pub fn resolve(&mut self, label: &str) -> Outcome {
        let label = label.trim();
        if label.is_empty() {
            self.reset();
            return Outcome::Skipped;
        }

        let mut session = self.session.session;
        let token = session.advance();
        self.session = ResolutionSession {
            session,
            subject_label: label.to_string(),
            status: ResolveStatus::ResolvingCanonical,
            ..ResolutionSession::default()
        };
        tracing::debug!(label, session = token, "resolver: canonical lookup issued");

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let label = label.to_string();
        tokio::spawn(async move {
            let outcome = client.find_exact(&label).await;
            let _ = tx.send(ResolveMessage::Canonical { session: token, outcome });
        });
        Outcome::Applied
    }

    /// Return to `Idle`; replies still in flight become stale.
    pub fn reset(&mut self) {
        let mut session = self.session.session;
        session.advance();
        self.session = ResolutionSession { session, ..ResolutionSession::default() };
        tracing::debug!(session = %session, "resolver: reset");
    }

    /// Resolve the current subject again from the first stage.
    pub fn retry(&mut self) -> Outcome {
        let label = self.session.subject_label.clone();
        self.resolve(&label)
    }

    /// Apply a stage reply received from the resolver's channel.
    pub fn handle(&mut self, message: ResolveMessage) -> Outcome {
        let token = message.session();
        if !self.session.session.is_current(token) {
            tracing::debug!(
                session = token,
                current = %self.session.session,
                "resolver: reply for abandoned session dropped"
            );
            return Outcome::Superseded;
        }

        match message {
            ResolveMessage::Canonical { outcome, .. } => {
                if self.session.status != ResolveStatus::ResolvingCanonical {
                    return Outcome::Superseded;
                }
                self.on_canonical(outcome)
            }
            ResolveMessage::Ancestors { outcome, .. } => {
                if self.session.status != ResolveStatus::ResolvingHierarchy {
                    return Outcome::Superseded;
                }
                self.on_ancestors(outcome)
            }
        }
    }

    /// Receive and apply messages until the current session stops resolving.
    pub async fn settle(&mut self, rx: &mut UnboundedReceiver<ResolveMessage>) {
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
    // Stage handlers
    // -----------------------------------------------------------------------

    fn on_canonical(&mut self, outcome: Result<Option<SearchHit>, LookupError>) -> Outcome {
        let hit = match outcome {
            Ok(Some(hit)) => hit,
            Ok(None) => {
                tracing::debug!(label = %self.session.subject_label, "resolver: no exact match");
                let label = self.session.subject_label.clone();
                return self.fail(EngineError::NotInCanonicalOntology { label });
            }
            Err(err) => {
                tracing::warn!(
                    label = %self.session.subject_label,
                    error = %err,
                    "resolver: canonical lookup failed"
                );
                return self.fail(EngineError::lookup(Stage::Canonical, err));
            }
        };

        let iri = hit.iri.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let obo_id = hit.obo_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
        self.session.canonical_id = obo_id.or(iri).map(str::to_string);

        let key = match iri {
            Some(iri) => LookupKey::from_iri(iri),
            None => Err(EngineError::MalformedIdentifier { iri: String::new() }),
        };
        let key = match key {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(canonical_id = ?self.session.canonical_id, "resolver: {err}");
                return self.fail(err);
            }
        };

        let token = self.session.session.value();
        self.session.lookup_key = Some(key.clone());
        self.session.status = ResolveStatus::ResolvingHierarchy;
        tracing::debug!(key = %key, session = token, "resolver: hierarchy fetch issued");

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = client.fetch_ancestors(&key).await;
            let _ = tx.send(ResolveMessage::Ancestors { session: token, outcome });
        });
        Outcome::Applied
    }

    fn on_ancestors(&mut self, outcome: Result<Vec<AncestorRecord>, LookupError>) -> Outcome {
        match outcome {
            Ok(records) => {
                self.session.ancestors = terms_from_records(&records);
                self.session.status = ResolveStatus::Done;
                tracing::info!(
                    label = %self.session.subject_label,
                    canonical_id = ?self.session.canonical_id,
                    ancestors = self.session.ancestors.len(),
                    "resolver: done"
                );
                Outcome::Applied
            }
            Err(err) => {
                tracing::warn!(
                    key = ?self.session.lookup_key.as_ref().map(LookupKey::as_str),
                    error = %err,
                    "resolver: hierarchy fetch failed"
                );
                self.fail(EngineError::lookup(Stage::Hierarchy, err))
            }
        }
    }

    fn fail(&mut self, err: EngineError) -> Outcome {
        self.session.ancestors.clear();
        self.session.error = Some(err);
        self.session.status = ResolveStatus::Errored;
        Outcome::Applied
    }
}

/// Map raw ancestor records to terms. Records without an IRI or label are
/// dropped; repeated IRIs keep their first occurrence.
pub fn terms_from_records(records: &[AncestorRecord]) -> Vec<HierarchyTerm> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(HierarchyTerm::from_record)
        .filter(|term| seen.insert(term.iri.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ancestor, canonical, transport_error, Call, ScriptedLookup};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn resolver(lookup: ScriptedLookup) -> (HierarchyResolver, UnboundedReceiver<ResolveMessage>, Arc<ScriptedLookup>) {
        let lookup = Arc::new(lookup);
        let (r, rx) = HierarchyResolver::new(lookup.clone());
        (r, rx, lookup)
    }

    fn labels(session: &ResolutionSession) -> Vec<&str> {
        session.ancestors.iter().map(|t| t.label.as_str()).collect()
    }

    fn asthma() -> ScriptedLookup {
        ScriptedLookup::new()
            .on_exact("Asthma", Some(canonical("Asthma", "EFO_0000270")))
            .on_ancestors(
                "EFO_0000270",
                vec![
                    ancestor("EFO_0000684", "respiratory disease"),
                    ancestor("EFO_0000408", "disease"),
                ],
            )
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_canonical_then_ancestors_in_order() {
        let (mut r, mut rx, lookup) = resolver(asthma());
        assert_eq!(r.resolve("Asthma"), Outcome::Applied);
        assert_eq!(r.session().status, ResolveStatus::ResolvingCanonical);
        r.settle(&mut rx).await;

        let s = r.session();
        assert_eq!(s.status, ResolveStatus::Done);
        assert_eq!(s.canonical_id.as_deref(), Some("EFO:0000270"));
        assert_eq!(s.lookup_key.as_ref().map(LookupKey::as_str), Some("EFO_0000270"));
        assert_eq!(labels(s), vec!["respiratory disease", "disease"]);
        assert_eq!(
            lookup.calls(),
            vec![Call::Exact("Asthma".into()), Call::Ancestors("EFO_0000270".into())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_exact_match_is_not_in_canonical_ontology() {
        let (mut r, mut rx, lookup) = resolver(ScriptedLookup::new().on_exact("Wibble", None));
        r.resolve("Wibble");
        r.settle(&mut rx).await;

        let s = r.session();
        assert_eq!(s.status, ResolveStatus::Errored);
        assert_eq!(
            s.error,
            Some(EngineError::NotInCanonicalOntology { label: "Wibble".into() })
        );
        assert_eq!(s.canonical_id, None);
        assert_eq!(lookup.calls().len(), 1, "no hierarchy fetch after a miss");
    }

    #[tokio::test(start_paused = true)]
    async fn canonical_transport_failure_is_errored() {
        let (mut r, mut rx, _) = resolver(
            ScriptedLookup::new().on_exact_after("Asthma", Duration::ZERO, Err(transport_error())),
        );
        r.resolve("Asthma");
        r.settle(&mut rx).await;
        assert!(matches!(
            r.session().error,
            Some(EngineError::Lookup { stage: Stage::Canonical, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn hierarchy_failure_retains_canonical_id() {
        let (mut r, mut rx, _) = resolver(
            ScriptedLookup::new()
                .on_exact("Asthma", Some(canonical("Asthma", "EFO_0000270")))
                .on_ancestors_after("EFO_0000270", Duration::ZERO, Err(transport_error())),
        );
        r.resolve("Asthma");
        r.settle(&mut rx).await;

        let s = r.session();
        assert_eq!(s.status, ResolveStatus::Errored);
        assert_eq!(s.canonical_id.as_deref(), Some("EFO:0000270"));
        assert!(s.ancestors.is_empty());
        assert_eq!(s.error_message().as_deref(), Some("Failed to fetch hierarchy."));
    }

    #[tokio::test(start_paused = true)]
    async fn hit_without_iri_is_malformed() {
        let hit = SearchHit { iri: None, ..canonical("Asthma", "EFO_0000270") };
        let (mut r, mut rx, lookup) = resolver(ScriptedLookup::new().on_exact("Asthma", Some(hit)));
        r.resolve("Asthma");
        r.settle(&mut rx).await;

        let s = r.session();
        assert!(matches!(s.error, Some(EngineError::MalformedIdentifier { .. })));
        assert_eq!(s.canonical_id.as_deref(), Some("EFO:0000270"));
        assert_eq!(lookup.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn canonical_id_falls_back_to_iri() {
        let hit = SearchHit { obo_id: None, ..canonical("Asthma", "EFO_0000270") };
        let (mut r, mut rx, _) = resolver(ScriptedLookup::new().on_exact("Asthma", Some(hit)));
        r.resolve("Asthma");
        r.settle(&mut rx).await;

        let s = r.session();
        assert_eq!(s.canonical_id.as_deref(), Some("http://www.ebi.ac.uk/efo/EFO_0000270"));
        assert_eq!(s.status, ResolveStatus::Done);
        assert!(s.ancestors.is_empty(), "empty chain is a valid result");
    }

    #[tokio::test(start_paused = true)]
    async fn new_selection_ignores_prior_resolution() {
        let lookup = ScriptedLookup::new()
            .on_exact_after(
                "Asthma",
                Duration::from_secs(2),
                Ok(Some(canonical("Asthma", "EFO_0000270"))),
            )
            .on_exact("Eczema", Some(canonical("Eczema", "EFO_0000274")))
            .on_ancestors("EFO_0000274", vec![ancestor("EFO_0000676", "skin disease")]);
        let (mut r, mut rx, lookup) = resolver(lookup);

        r.resolve("Asthma");
        r.resolve("Eczema");
        r.settle(&mut rx).await;
        assert_eq!(labels(r.session()), vec!["skin disease"]);

        let late = rx.recv().await.unwrap();
        assert_eq!(r.handle(late), Outcome::Superseded);
        let s = r.session();
        assert_eq!(s.subject_label, "Eczema");
        assert_eq!(s.canonical_id.as_deref(), Some("EFO:0000274"));
        assert_eq!(labels(s), vec!["skin disease"]);
        assert!(
            !lookup.calls().contains(&Call::Ancestors("EFO_0000270".into())),
            "abandoned session must not reach the second stage"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_during_hierarchy_stage_drops_reply() {
        let lookup = ScriptedLookup::new()
            .on_exact("Asthma", Some(canonical("Asthma", "EFO_0000270")))
            .on_ancestors_after(
                "EFO_0000270",
                Duration::from_millis(500),
                Ok(vec![ancestor("EFO_0000408", "disease")]),
            );
        let (mut r, mut rx, _) = resolver(lookup);
        r.resolve("Asthma");
        let canonical_reply = rx.recv().await.unwrap();
        r.handle(canonical_reply);
        assert_eq!(r.session().status, ResolveStatus::ResolvingHierarchy);

        r.reset();
        let late = rx.recv().await.unwrap();
        assert_eq!(r.handle(late), Outcome::Superseded);
        assert_eq!(r.session().status, ResolveStatus::Idle);
        assert!(r.session().ancestors.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_label_resets_without_lookup() {
        let (mut r, _rx, lookup) = resolver(asthma());
        assert_eq!(r.resolve("   "), Outcome::Skipped);
        assert_eq!(r.session().status, ResolveStatus::Idle);
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_restarts_from_canonical_stage() {
        let (mut r, mut rx, lookup) = resolver(asthma());
        r.resolve("Asthma");
        r.settle(&mut rx).await;
        r.retry();
        assert_eq!(r.session().status, ResolveStatus::ResolvingCanonical);
        r.settle(&mut rx).await;
        assert_eq!(r.session().status, ResolveStatus::Done);
        assert_eq!(lookup.calls().len(), 4);
    }

    #[test]
    fn records_are_deduplicated_by_iri() {
        let records = vec![
            ancestor("EFO_0000684", "respiratory disease"),
            AncestorRecord { label: None, ..ancestor("EFO_0000001", "nameless") },
            ancestor("EFO_0000408", "disease"),
            ancestor("EFO_0000684", "respiratory disease (dup)"),
        ];
        let terms = terms_from_records(&records);
        let labels: Vec<_> = terms.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["respiratory disease", "disease"]);
    }
}
