//! Shared test fixtures for the project-descriptor workspace.
//!
//! This crate provides standardised fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`git`] — hermetic git repository fixtures built on `git2`
//! - [`project`] — [`project::TestProject`] builder for on-disk descriptors

pub mod git;
pub mod project;
