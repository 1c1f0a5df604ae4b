//! Git abstraction for the project-descriptor workspace.
//!
//! Two concerns live here: a read-only [`RepositoryFacts`] snapshot taken
//! when a descriptor is loaded, and the handful of mutating operations the
//! recipe cache needs (recursive clone, fast-forward pull, submodule
//! update).

pub mod error;
pub mod facts;
pub mod remote;
pub mod url;

pub use error::{Error, Result};
pub use facts::{DETACHED_HEAD, NO_VERSION, RESOLVED_SUFFIX, RepositoryFacts};
pub use remote::{clone_recursive, head_sha, pull_branch, update_submodules};
