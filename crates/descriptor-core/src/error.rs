//! Error types for descriptor-core

use std::path::PathBuf;

/// Result type for descriptor-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in descriptor-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No schema recognizer matched the path
    #[error("No valid project descriptor found at '{path}'")]
    NotFound { path: PathBuf },

    /// A recognizer matched but a required file or key is missing or unparsable
    #[error("Malformed descriptor: {message}")]
    Malformed { message: String },

    /// Legacy TYPE_VERSION outside the recognized set
    #[error("The project version {version} is not supported")]
    UnsupportedVersion { version: String },

    /// (type, type-version) pair absent from the template tables
    #[error("Template {ptype} v{version} for project {path} is not supported")]
    UnsupportedTemplate {
        ptype: String,
        version: String,
        path: PathBuf,
    },

    /// Generation-4 needs-recipe/recipes-section mismatch
    #[error("Inconsistent descriptor: {message}")]
    Inconsistent { message: String },

    /// Recipe selector names a recipe the project does not declare
    #[error("Recipe '{name}' not defined in this project. Available recipes are: {available:?}")]
    UnknownRecipe {
        name: String,
        available: Vec<String>,
    },

    /// Recipe selector supplied for a project that does not need a recipe
    #[error(
        "Cannot select recipe '{name}' on a project that is set not to need a recipe \
         (options.needs_recipe=false)"
    )]
    RecipeNotSelectable { name: String },

    /// Recipe directory missing after a clone attempt, or never cloned
    #[error("Recipe not found at '{path}'")]
    RecipeNotFound { path: PathBuf },

    /// Architecture string outside the canonical set
    #[error("Architecture '{arch}' is not supported. Valid choices are: {valid}")]
    InvalidArchitecture { arch: String, valid: String },

    /// Release-only operation on a repository that is not in a release state
    #[error("The project repository is not in a release state")]
    NotReleased,

    /// Expected capability gap on legacy descriptor generations
    #[error("Field '{field}' not implemented for descriptor v{version}")]
    NotImplemented { field: String, version: String },

    /// Recipe provider without an update-API implementation
    #[error("Provider '{provider}' has no update API implementation")]
    UnsupportedProvider { provider: String },

    /// Remote registry has no metadata for the image
    #[error("Remote image '{image}' not found")]
    ImageNotFound { image: String },

    #[error(transparent)]
    Fs(#[from] descriptor_fs::Error),

    #[error(transparent)]
    Git(#[from] descriptor_git::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for a [`Error::Malformed`] with a formatted message.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::Malformed {
            message: message.into(),
        }
    }

    /// Shorthand for the legacy-generation capability gap.
    pub(crate) fn not_implemented(field: &str, version: &str) -> Self {
        Error::NotImplemented {
            field: field.to_string(),
            version: version.to_string(),
        }
    }
}
