//! Core descriptor model for templated software repositories.
//!
//! A project descriptor is the on-disk metadata of one project: which of
//! four schema generations it uses, its typed configuration layers, its
//! version-control facts, and the recipe that supplies its build context.
//! [`Descriptor`] is the single entry point; everything else supports it.
//!
//! ```no_run
//! use descriptor_core::Descriptor;
//!
//! let project = Descriptor::open("/path/to/project")?;
//! println!("{} v{}", project.name(), project.version());
//! # Ok::<(), descriptor_core::Error>(())
//! ```

pub mod deps;
pub mod descriptor;
pub mod error;
pub mod layers;
pub mod loader;
pub mod naming;
pub mod recipe;
pub mod registry;
pub mod templates;

pub use descriptor::{
    Adapter, DEFAULT_RECIPE_NAME, DEFAULT_VERSION_NAME, Descriptor, ImageOptions, LoadOptions,
};
pub use error::{Error, Result};
pub use layers::{
    BaseLayer, DistroLayer, FormatLayer, Hook, HooksLayer, Layers, Maintainer, OptionsLayer,
    Recipe, Section, SelfLayer, TemplateLayer,
};
pub use loader::Generation;
pub use naming::{CANONICAL_ARCHITECTURES, canonical_arch, sanitize_version};
pub use recipe::ResolverConfig;
pub use registry::RegistryClient;
