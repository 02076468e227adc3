//! efo-explorer — resolve free-text disease names to EFO terms and their
//! ancestor chains.
//!
//! # Architecture
//!
//! ```text
//! efo-tui / headless ──► efo-core (SearchController, HierarchyResolver)
//!                                   │
//!                                   ▼
//!                         OntologyLookup ◄── efo-ols (OLS4 over HTTP)
//! ```
//!
//! The binary picks a front end; everything stateful lives in `efo-core`.

pub mod headless;

pub use efo_core;
pub use efo_ols;
