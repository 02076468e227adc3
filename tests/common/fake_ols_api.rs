//! Fake OLS4 REST API for integration tests.
//!
//! Spins up a minimal `axum` server on a random TCP port bound to 127.0.0.1.
//! Serves:
//! - `GET /api/search`: free-text (`label` contains `q`) or exact
//!   (`exact=true`, label equals `q`) matching over the registered terms
//! - `GET /api/ontologies/{ontology}/terms/{iri}/hierarchicalAncestors`:
//!   the registered ancestor chain; `{iri}` arrives double-encoded
//!
//! Every request is recorded so tests can assert how many lookups were made
//! and with what parameters.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use super::builders::TermFixture;

/// One request as seen by the fake server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Search { q: String, exact: bool },
    Ancestors { iri: String },
}

#[derive(Default)]
struct ApiState {
    terms: Vec<TermFixture>,
    /// Term IRI → ancestor chain in service order.
    ancestors: HashMap<String, Vec<TermFixture>>,
    /// Search text → artificial response delay.
    delays: HashMap<String, Duration>,
    failing_search: HashSet<String>,
    garbled_search: HashSet<String>,
    failing_ancestors: HashSet<String>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<ApiState>>;

/// Handle to the running fake OLS server.
pub struct FakeOlsApi {
    addr: SocketAddr,
    state: Shared,
}

impl FakeOlsApi {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::default();

        let app = Router::new()
            .route("/api/search", get(search))
            .route(
                "/api/ontologies/{ontology}/terms/{iri}/hierarchicalAncestors",
                get(ancestors),
            )
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Base URL to configure as `[ols] base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn add_term(&self, term: TermFixture) {
        self.state.lock().await.terms.push(term);
    }

    /// Register `term` and its ancestor chain. The ancestors are not
    /// themselves searchable unless added with [`FakeOlsApi::add_term`].
    pub async fn add_term_with_ancestors(&self, term: TermFixture, chain: Vec<TermFixture>) {
        let mut state = self.state.lock().await;
        state.ancestors.insert(term.iri.clone(), chain);
        state.terms.push(term);
    }

    pub async fn delay_search(&self, q: &str, delay: Duration) {
        self.state.lock().await.delays.insert(q.to_string(), delay);
    }

    /// Answer searches for `q` with HTTP 500.
    pub async fn fail_search(&self, q: &str) {
        self.state.lock().await.failing_search.insert(q.to_string());
    }

    /// Answer searches for `q` with a 200 and a body that is not JSON.
    pub async fn garble_search(&self, q: &str) {
        self.state.lock().await.garbled_search.insert(q.to_string());
    }

    /// Answer ancestor requests for `iri` with HTTP 503.
    pub async fn fail_ancestors(&self, iri: &str) {
        self.state.lock().await.failing_ancestors.insert(iri.to_string());
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.state.lock().await.requests.clone()
    }

    /// The `q` of every non-exact search, in arrival order.
    pub async fn search_queries(&self) -> Vec<String> {
        self.requests()
            .await
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Search { q, exact: false } => Some(q),
                _ => None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn search(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Shared>,
) -> Response {
    let q = params.get("q").cloned().unwrap_or_default();
    let exact = params.get("exact").is_some_and(|v| v == "true");
    let rows: usize = params.get("rows").and_then(|r| r.parse().ok()).unwrap_or(10);

    let (delay, docs, failing, garbled) = {
        let mut state = state.lock().await;
        state.requests.push(Recorded::Search { q: q.clone(), exact });
        let needle = q.to_lowercase();
        let docs: Vec<serde_json::Value> = state
            .terms
            .iter()
            .filter(|t| {
                let label = t.label.to_lowercase();
                if exact {
                    label == needle
                } else {
                    label.contains(&needle)
                }
            })
            .take(rows)
            .map(TermFixture::search_doc)
            .collect();
        (
            state.delays.get(&q).copied(),
            docs,
            state.failing_search.contains(&q),
            state.garbled_search.contains(&q),
        )
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "solr unavailable").into_response();
    }
    if garbled {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }

    Json(json!({
        "responseHeader": { "status": 0 },
        "response": { "numFound": docs.len(), "start": 0, "docs": docs }
    }))
    .into_response()
}

async fn ancestors(
    Path((_ontology, encoded)): Path<(String, String)>,
    State(state): State<Shared>,
) -> Response {
    // axum has already undone one level of encoding.
    let iri = url::form_urlencoded::parse(encoded.as_bytes())
        .next()
        .map(|(k, _)| k.into_owned())
        .unwrap_or_default();

    let mut state = state.lock().await;
    state.requests.push(Recorded::Ancestors { iri: iri.clone() });

    if state.failing_ancestors.contains(&iri) {
        return (StatusCode::SERVICE_UNAVAILABLE, "").into_response();
    }
    match state.ancestors.get(&iri) {
        None => (StatusCode::NOT_FOUND, "").into_response(),
        Some(chain) if chain.is_empty() => {
            Json(json!({ "page": { "size": 20, "totalElements": 0, "number": 0 } })).into_response()
        }
        Some(chain) => {
            let terms: Vec<_> = chain.iter().map(TermFixture::term_doc).collect();
            Json(json!({
                "_embedded": { "terms": terms },
                "page": { "size": 20, "totalElements": chain.len(), "number": 0 }
            }))
            .into_response()
        }
    }
}
