//! Error taxonomy for the query-resolution engine.
//!
//! [`LookupError`] is what an [`OntologyLookup`](crate::lookup::OntologyLookup)
//! returns when a call could not produce a valid response. A valid response
//! with zero results is *not* an error at that layer: it comes back as an
//! empty `Vec` or `None`.
//!
//! [`EngineError`] is what the engine stores in a session once a failure has
//! been caught at the component boundary. Its `Display` text is the
//! user-facing message.

use thiserror::Error;

/// A lookup call failed before yielding a usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Connection refused, DNS failure, timeout, …
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("ontology service returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The body could not be decoded into the expected shape.
    #[error("could not decode ontology service response: {0}")]
    Decode(String),
}

/// Which lookup a [`EngineError::Lookup`] came from. Drives the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Search,
    Canonical,
    Hierarchy,
}

/// A failure surfaced to the user through a session's error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The search returned no usable hits.
    #[error("No matches found. Please provide an actual disease name.")]
    NoMatches,

    /// The exact-label lookup returned nothing.
    #[error("Term \"{label}\" not found in canonical ontology")]
    NotInCanonicalOntology { label: String },

    /// The canonical hit carried no parseable resource path.
    #[error("Malformed identifier: {iri:?}")]
    MalformedIdentifier { iri: String },

    #[error("{}", lookup_message(.stage))]
    Lookup {
        stage: Stage,
        #[source]
        source: LookupError,
    },
}

impl EngineError {
    pub fn lookup(stage: Stage, source: LookupError) -> Self {
        Self::Lookup { stage, source }
    }

    /// Whether re-triggering the same action can reasonably succeed.
    ///
    /// Only transport failures qualify; the others depend on user input or
    /// on the service's data.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}

fn lookup_message(stage: &Stage) -> &'static str {
    match stage {
        Stage::Search => "Failed to fetch diseases. Please try again.",
        Stage::Canonical => "Failed to fetch disease details.",
        Stage::Hierarchy => "Failed to fetch hierarchy.",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
