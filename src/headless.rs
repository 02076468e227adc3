//! Headless mode — one search or one resolution, printed and done.
//!
//! Drives the same [`SearchController`] and [`HierarchyResolver`] the TUI
//! uses, with no debounce, and prints the settled session as text or JSON.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;

use efo_core::{
    Candidate, HierarchyResolver, HierarchyTerm, OntologyLookup, ResolveStatus,
    SearchController, SearchStatus,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Search(String),
    Resolve(String),
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub status: &'static str,
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    pub label: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_page: Option<String>,
    pub ancestors: Vec<HierarchyTerm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Search(SearchReport),
    Resolve(ResolveReport),
}

impl Report {
    /// Whether the engine ended in a failure state.
    pub fn is_error(&self) -> bool {
        match self {
            Report::Search(r) => r.error.is_some(),
            Report::Resolve(r) => r.error.is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

pub async fn search(client: Arc<dyn OntologyLookup>, query: &str) -> SearchReport {
    let (mut controller, mut rx) = SearchController::new(client, Duration::ZERO);
    controller.submit(query);
    controller.settle(&mut rx).await;

    let session = controller.session();
    SearchReport {
        query: session.query.clone(),
        status: search_status(session.status),
        candidates: session.candidates.clone(),
        error: session.error_message(),
    }
}

pub async fn resolve(client: Arc<dyn OntologyLookup>, label: &str) -> ResolveReport {
    let (mut resolver, mut rx) = HierarchyResolver::new(Arc::clone(&client));
    resolver.resolve(label);
    resolver.settle(&mut rx).await;

    let session = resolver.session();
    ResolveReport {
        label: session.subject_label.clone(),
        status: resolve_status(session.status),
        canonical_id: session.canonical_id.clone(),
        term_page: session
            .canonical_id
            .as_deref()
            .and_then(|id| client.term_page_url(id)),
        ancestors: session.ancestors.clone(),
        error: session.error_message(),
    }
}

/// Run `request`, write the report to `out`, and return it.
pub async fn run(
    client: Arc<dyn OntologyLookup>,
    request: &Request,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<Report> {
    let report = match request {
        Request::Search(query) => Report::Search(search(client, query).await),
        Request::Resolve(label) => Report::Resolve(resolve(client, label).await),
    };
    tracing::debug!(error = report.is_error(), "headless: finished");
    out.write_all(render(&report, format)?.as_bytes())?;
    out.flush()?;
    Ok(report)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Text => Ok(match report {
            Report::Search(r) => render_search(r),
            Report::Resolve(r) => render_resolve(r),
        }),
    }
}

fn render_search(r: &SearchReport) -> String {
    let mut out = String::new();
    if let Some(err) = &r.error {
        out.push_str(&format!("error: {err}\n"));
        return out;
    }
    for c in &r.candidates {
        out.push_str(&format!("{}  [{}]\n", c.label, c.id));
        if let Some(desc) = &c.description {
            out.push_str(&format!("    {}\n", first_line(desc)));
        }
    }
    out
}

fn render_resolve(r: &ResolveReport) -> String {
    let mut out = format!("{}\n", r.label);
    if let Some(id) = &r.canonical_id {
        match &r.term_page {
            Some(link) => out.push_str(&format!("EFO ID: {id}  {link}\n")),
            None => out.push_str(&format!("EFO ID: {id}\n")),
        }
    }
    if let Some(err) = &r.error {
        out.push_str(&format!("error: {err}\n"));
        return out;
    }
    if r.ancestors.is_empty() {
        out.push_str("No hierarchy information available.\n");
        return out;
    }
    out.push_str(&format!("Hierarchy ({}):\n", r.ancestors.len()));
    for term in &r.ancestors {
        match &term.obo_id {
            Some(obo) => out.push_str(&format!("  {} ({obo})\n", term.label)),
            None => out.push_str(&format!("  {}\n", term.label)),
        }
    }
    out
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or_default()
}

fn search_status(status: SearchStatus) -> &'static str {
    match status {
        SearchStatus::Idle => "idle",
        SearchStatus::Pending => "pending",
        SearchStatus::Settled => "settled",
        SearchStatus::Errored => "errored",
    }
}

fn resolve_status(status: ResolveStatus) -> &'static str {
    match status {
        ResolveStatus::Idle => "idle",
        ResolveStatus::ResolvingCanonical => "resolving-canonical",
        ResolveStatus::ResolvingHierarchy => "resolving-hierarchy",
        ResolveStatus::Done => "done",
        ResolveStatus::Errored => "errored",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
