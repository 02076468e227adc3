//! efo-ols — EBI OLS4 adapter for the efo-explorer lookup client.
//!
//! [`OlsClient`] implements [`OntologyLookup`] over the OLS4 REST API:
//!
//! | operation | request |
//! |---|---|
//! | `search_candidates` | `GET {base}/api/search?q=…&ontology=…&fieldList=…&rows=N` |
//! | `find_exact` | same, plus `exact=true&queryFields=label&rows=1` |
//! | `fetch_ancestors` | `GET {base}/api/ontologies/{onto}/terms/{iri²}/hierarchicalAncestors` |
//!
//! `iri²` is the term IRI percent-encoded twice, which is how OLS expects a
//! term IRI embedded in a path segment.

mod wire;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::form_urlencoded::byte_serialize;

use efo_core::config::OlsConfig;
use efo_core::{AncestorRecord, LookupError, LookupKey, OntologyLookup, SearchHit};

use wire::{AncestorsEnvelope, SearchEnvelope};

const FIELD_LIST: &str = "id,label,description,iri,obo_id,short_form";

/// Page size requested for ancestor chains; OLS defaults to 20.
const ANCESTOR_PAGE_SIZE: u32 = 500;

#[derive(Debug, Error)]
pub enum OlsError {
    #[error("invalid OLS configuration: {0}")]
    Config(String),

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OlsClient {
    http: Client,
    base_url: String,
    ontology: String,
    rows: u32,
}

impl OlsClient {
    pub fn new(config: &OlsConfig) -> Result<Self, OlsError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(OlsError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                config.base_url
            )));
        }
        if config.ontology.trim().is_empty() {
            return Err(OlsError::Config("ontology must not be empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("efo-explorer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            ontology: config.ontology.trim().to_string(),
            rows: config.rows.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self) -> String {
        format!("{}/api/search", self.base_url)
    }

    fn ancestors_url(&self, key: &LookupKey) -> String {
        format!(
            "{}/api/ontologies/{}/terms/{}/hierarchicalAncestors",
            self.base_url,
            self.ontology,
            double_encode(key.iri())
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, LookupError> {
        let response = request
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        let url = response.url().to_string();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %url, "ols: non-success status");
            return Err(LookupError::Status { status: status.as_u16(), url });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "ols: undecodable body");
            LookupError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl OntologyLookup for OlsClient {
    async fn search_candidates(&self, term: &str) -> Result<Vec<SearchHit>, LookupError> {
        let rows = self.rows.to_string();
        let request = self.http.get(self.search_url()).query(&[
            ("q", term),
            ("ontology", self.ontology.as_str()),
            ("fieldList", FIELD_LIST),
            ("rows", rows.as_str()),
        ]);
        let envelope: SearchEnvelope = self.get_json(request).await?;
        tracing::debug!(term, found = envelope.response.num_found, "ols: search");
        Ok(envelope.response.docs.into_iter().map(SearchHit::from).collect())
    }

    async fn find_exact(&self, label: &str) -> Result<Option<SearchHit>, LookupError> {
        let request = self.http.get(self.search_url()).query(&[
            ("q", label),
            ("ontology", self.ontology.as_str()),
            ("exact", "true"),
            ("queryFields", "label"),
            ("fieldList", FIELD_LIST),
            ("rows", "1"),
        ]);
        tracing::debug!(label, "ols: exact lookup");
        let envelope: SearchEnvelope = self.get_json(request).await?;
        Ok(envelope.response.docs.into_iter().next().map(SearchHit::from))
    }

    async fn fetch_ancestors(&self, key: &LookupKey) -> Result<Vec<AncestorRecord>, LookupError> {
        let size = ANCESTOR_PAGE_SIZE.to_string();
        let request = self
            .http
            .get(self.ancestors_url(key))
            .query(&[("size", size.as_str())]);
        tracing::debug!(key = %key, "ols: hierarchical ancestors");
        let envelope: AncestorsEnvelope = self.get_json(request).await?;
        let missing = envelope.missing();
        if missing > 0 {
            tracing::warn!(
                key = %key,
                missing,
                page_size = ANCESTOR_PAGE_SIZE,
                "ols: ancestor chain truncated to one page"
            );
        }
        Ok(envelope.into_records())
    }

    fn term_page_url(&self, canonical_id: &str) -> Option<String> {
        let id = canonical_id.trim();
        if id.is_empty() {
            return None;
        }
        let param = if id.starts_with("http://") || id.starts_with("https://") {
            "iri"
        } else {
            "obo_id"
        };
        Some(format!(
            "{}/ontologies/{}/terms?{}={}",
            self.base_url,
            self.ontology,
            param,
            byte_serialize(id.as_bytes()).collect::<String>()
        ))
    }
}

fn double_encode(iri: &str) -> String {
    let once: String = byte_serialize(iri.as_bytes()).collect();
    byte_serialize(once.as_bytes()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
