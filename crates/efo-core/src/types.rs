//! Core types for efo-core.
//!
//! Two families live here: the raw records an [`OntologyLookup`] returns
//! ([`SearchHit`], [`AncestorRecord`]), which may be missing any field, and
//! the validated entities the engine hands to the UI ([`Candidate`],
//! [`HierarchyTerm`]). Mapping between the two happens in the search and
//! resolver modules, never in a lookup adapter.
//!
//! [`OntologyLookup`]: crate::lookup::OntologyLookup

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Raw lookup records
// ---------------------------------------------------------------------------

/// One document returned by a text or exact-label search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHit {
    /// Opaque service identifier of the document.
    pub id: Option<String>,
    pub label: Option<String>,
    /// Upstream descriptions, in service order. Usually zero or one entry.
    pub description: Vec<String>,
    /// Canonical resource IRI, e.g. `http://www.ebi.ac.uk/efo/EFO_0000270`.
    pub iri: Option<String>,
    /// OBO-style short id, e.g. `EFO:0000270`.
    pub obo_id: Option<String>,
    pub short_form: Option<String>,
}

/// One ancestor as returned by a hierarchy fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorRecord {
    pub iri: Option<String>,
    pub label: Option<String>,
    pub description: Vec<String>,
    pub obo_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Engine entities
// ---------------------------------------------------------------------------

/// A selectable search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    /// Display name. Never empty.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The candidate shape exposed to front ends.
pub type Disease = Candidate;

impl Candidate {
    /// Build a candidate from a raw hit, or `None` when the hit has no usable
    /// identifier or label.
    pub fn from_hit(hit: &SearchHit) -> Option<Self> {
        let id = non_blank(hit.id.as_deref())?;
        let label = non_blank(hit.label.as_deref())?;
        Some(Self {
            id: id.to_string(),
            label: label.to_string(),
            description: first_description(&hit.description),
        })
    }
}

/// One entry of an ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyTerm {
    /// Canonical IRI. Unique within one resolution.
    pub iri: String,
    pub label: String,
    /// First upstream description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obo_id: Option<String>,
}

impl HierarchyTerm {
    /// Build a term from a raw record, or `None` when the record has no IRI
    /// or label.
    pub fn from_record(record: &AncestorRecord) -> Option<Self> {
        let iri = non_blank(record.iri.as_deref())?;
        let label = non_blank(record.label.as_deref())?;
        Some(Self {
            iri: iri.to_string(),
            label: label.to_string(),
            description: first_description(&record.description),
            obo_id: non_blank(record.obo_id.as_deref()).map(str::to_string),
        })
    }
}

// ---------------------------------------------------------------------------
// Lookup key
// ---------------------------------------------------------------------------

/// Short-form token used to fetch a term's ancestors.
///
/// Derived from the final path segment of a canonical IRI:
/// `http://www.ebi.ac.uk/efo/EFO_0000270` → `EFO_0000270`. The IRI is kept
/// alongside so adapters can address the term exactly even when it lives
/// outside the ontology's own namespace (MONDO, Orphanet, …).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupKey {
    short_form: String,
    iri: String,
}

impl LookupKey {
    /// Derive the key from a canonical IRI.
    ///
    /// The final segment must be non-empty and consist only of ASCII
    /// alphanumerics, `_`, `-`, `.` or `:`. Anything else is reported as
    /// [`EngineError::MalformedIdentifier`].
    pub fn from_iri(iri: &str) -> Result<Self, EngineError> {
        let malformed = || EngineError::MalformedIdentifier { iri: iri.to_string() };

        let trimmed = iri.trim();
        let (_, segment) = trimmed.rsplit_once('/').ok_or_else(malformed)?;
        let valid = !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
        if !valid {
            return Err(malformed());
        }

        Ok(Self {
            short_form: segment.to_string(),
            iri: trimmed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.short_form
    }

    /// The IRI this key was derived from.
    pub fn iri(&self) -> &str {
        &self.iri
    }
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.short_form)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn first_description(values: &[String]) -> Option<String> {
    values
        .first()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
