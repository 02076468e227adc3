//! Shared test utilities for efo-explorer integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file.

#![allow(dead_code)]

pub mod assertions;
pub mod builders;
pub mod fake_ols_api;
pub mod fixtures;

pub use builders::*;
pub use fake_ols_api::{FakeOlsApi, Recorded};
pub use fixtures::*;
