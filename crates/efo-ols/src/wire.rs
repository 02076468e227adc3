//! Serde shapes of the OLS4 JSON responses we consume.
//!
//! Only the fields the engine maps are declared; everything else in the
//! payload is ignored.

use serde::Deserialize;

use efo_core::{AncestorRecord, SearchHit};

/// `GET /api/search`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    pub response: SearchResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchDoc {
    pub id: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<OneOrMany>,
    pub iri: Option<String>,
    pub obo_id: Option<String>,
    pub short_form: Option<String>,
}

impl From<SearchDoc> for SearchHit {
    fn from(doc: SearchDoc) -> Self {
        SearchHit {
            id: doc.id,
            label: doc.label,
            description: doc.description.map(OneOrMany::into_vec).unwrap_or_default(),
            iri: doc.iri,
            obo_id: doc.obo_id,
            short_form: doc.short_form,
        }
    }
}

/// `GET /api/ontologies/{onto}/terms/{iri}/hierarchicalAncestors`
///
/// OLS omits `_embedded` entirely for a root term.
#[derive(Debug, Deserialize)]
pub(crate) struct AncestorsEnvelope {
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<Embedded>,
    #[serde(default)]
    pub page: Option<Page>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    #[serde(rename = "totalElements", default)]
    pub total_elements: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Embedded {
    #[serde(default)]
    pub terms: Vec<TermDoc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TermDoc {
    pub iri: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<OneOrMany>,
    pub obo_id: Option<String>,
}

impl From<TermDoc> for AncestorRecord {
    fn from(doc: TermDoc) -> Self {
        AncestorRecord {
            iri: doc.iri,
            label: doc.label,
            description: doc.description.map(OneOrMany::into_vec).unwrap_or_default(),
            obo_id: doc.obo_id,
        }
    }
}

impl AncestorsEnvelope {
    /// Ancestors the service reports beyond those in this page.
    pub fn missing(&self) -> u64 {
        let returned = self.embedded.as_ref().map_or(0, |e| e.terms.len()) as u64;
        self.page
            .as_ref()
            .map_or(0, |p| p.total_elements.saturating_sub(returned))
    }

    pub fn into_records(self) -> Vec<AncestorRecord> {
        self.embedded
            .map(|e| e.terms.into_iter().map(AncestorRecord::from).collect())
            .unwrap_or_default()
    }
}

/// OLS returns `description` as a bare string on some endpoints and as an
/// array on others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}
