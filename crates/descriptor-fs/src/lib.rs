//! Filesystem primitives for the project-descriptor workspace.
//!
//! Provides normalized path handling, plain text I/O with error context,
//! and a format-agnostic configuration store.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
