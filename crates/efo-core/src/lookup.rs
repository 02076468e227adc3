//! The ontology lookup abstraction shared by both engine components.

use async_trait::async_trait;

use crate::error::LookupError;
use crate::types::{AncestorRecord, LookupKey, SearchHit};

/// Read-only access to an external ontology service.
///
/// Implementations perform the network calls and translate the wire format
/// into raw records; they never filter or validate beyond that. A valid
/// response with no results is `Ok` (empty `Vec` / `None`), distinct from a
/// [`LookupError`].
#[async_trait]
pub trait OntologyLookup: Send + Sync {
    /// Free-text search, results in service order.
    async fn search_candidates(&self, term: &str) -> Result<Vec<SearchHit>, LookupError>;

    /// Exact match on the label field. At most one hit is consumed.
    async fn find_exact(&self, label: &str) -> Result<Option<SearchHit>, LookupError>;

    /// Hierarchical ancestors of the term identified by `key`, nearest first.
    async fn fetch_ancestors(&self, key: &LookupKey) -> Result<Vec<AncestorRecord>, LookupError>;

    /// Browser URL for a canonical id, when the service has one.
    fn term_page_url(&self, _canonical_id: &str) -> Option<String> {
        None
    }
}
