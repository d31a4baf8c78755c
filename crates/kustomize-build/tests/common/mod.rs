//! Shared test utilities for kustomize-build integration tests.
//!
//! This module provides:
//! - `TestRepo` for isolated fixture repositories in temp directories
//! - `FakeRunner`, an in-process stand-in for the kustomize binary
//! - `SpecBuilder` for writing `KustomizeBuild` resources

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
