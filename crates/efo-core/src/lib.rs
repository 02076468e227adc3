//! efo-core — query-resolution engine for efo-explorer.
//!
//! This crate owns everything between a keystroke and an ancestor chain:
//! the shared types, the lookup-client abstraction, and the two stateful
//! components that drive it.
//!
//! # Architecture
//!
//! ```text
//! input ──► SearchController ──► selection ──► HierarchyResolver ──► ancestors
//!                 │                                   │
//!                 └──────────► OntologyLookup ◄───────┘
//! ```
//!
//! Both components report lookup results back to their owner over `tokio`
//! channels; the owner feeds them back through `handle()`. Only the owner's
//! loop ever mutates session state.

pub mod config;
pub mod debounce;
pub mod error;
pub mod lookup;
pub mod resolver;
pub mod search;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{EngineError, LookupError, Stage};
pub use lookup::OntologyLookup;
pub use resolver::{HierarchyResolver, ResolutionSession, ResolveMessage, ResolveStatus};
pub use search::{SearchController, SearchMessage, SearchSession, SearchStatus};
pub use types::{AncestorRecord, Candidate, Disease, HierarchyTerm, LookupKey, SearchHit};

/// What happened to a message fed into one of the engine components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The message changed session state.
    Applied,
    /// Input was empty; state reset without any lookup.
    Skipped,
    /// The message belonged to an older generation or session and was dropped.
    Superseded,
}
