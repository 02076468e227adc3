//! Test builders — ergonomic constructors for ontology terms served by the
//! fake OLS API.

use serde_json::{json, Value};

pub const EFO_NS: &str = "http://www.ebi.ac.uk/efo/";
pub const MONDO_NS: &str = "http://purl.obolibrary.org/obo/";

/// Fluent builder for one ontology term.
///
/// ```rust,ignore
/// let asthma = TermFixture::efo("asthma", "EFO_0000270")
///     .description("A bronchial disease.");
/// ```
#[derive(Debug, Clone)]
pub struct TermFixture {
    pub label: String,
    pub short_form: String,
    pub iri: String,
    pub descriptions: Vec<String>,
    pub with_obo_id: bool,
}

impl TermFixture {
    pub fn efo(label: &str, short_form: &str) -> Self {
        Self::in_namespace(EFO_NS, label, short_form)
    }

    pub fn mondo(label: &str, short_form: &str) -> Self {
        Self::in_namespace(MONDO_NS, label, short_form)
    }

    pub fn in_namespace(ns: &str, label: &str, short_form: &str) -> Self {
        Self {
            label: label.to_string(),
            short_form: short_form.to_string(),
            iri: format!("{ns}{short_form}"),
            descriptions: Vec::new(),
            with_obo_id: true,
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.descriptions.push(text.to_string());
        self
    }

    /// Serve the term without an `obo_id`.
    pub fn without_obo_id(mut self) -> Self {
        self.with_obo_id = false;
        self
    }

    pub fn obo_id(&self) -> String {
        self.short_form.replacen('_', ":", 1)
    }

    /// Shape of a `/api/search` document. Search returns `description` as an
    /// array.
    pub fn search_doc(&self) -> Value {
        let mut doc = json!({
            "id": format!("efo:class:{}", self.short_form),
            "label": self.label,
            "iri": self.iri,
            "short_form": self.short_form,
            "description": self.descriptions,
        });
        if self.with_obo_id {
            doc["obo_id"] = json!(self.obo_id());
        }
        doc
    }

    /// Shape of a `hierarchicalAncestors` term.
    pub fn term_doc(&self) -> Value {
        let mut doc = json!({
            "iri": self.iri,
            "label": self.label,
            "short_form": self.short_form,
            "description": self.descriptions,
            "ontology_name": "efo",
            "has_children": true,
        });
        if self.with_obo_id {
            doc["obo_id"] = json!(self.obo_id());
        }
        doc
    }
}
