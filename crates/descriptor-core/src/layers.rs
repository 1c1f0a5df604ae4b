//! Typed configuration layers for generation-4 descriptors.
//!
//! Each layer corresponds to one `*.yaml` file inside the `descriptor/`
//! directory. Layers are pure data: validation and defaults only.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default git provider host for templates and recipes.
pub const DEFAULT_GIT_PROVIDER: &str = "github.com";

/// Default organization for base images and recipes.
pub const DEFAULT_ORGANIZATION: &str = "templates";

/// Default project icon.
pub const DEFAULT_PROJECT_ICON: &str = "square";

fn default_provider() -> String {
    DEFAULT_GIT_PROVIDER.to_string()
}

fn default_organization() -> String {
    DEFAULT_ORGANIZATION.to_string()
}

fn default_icon() -> String {
    DEFAULT_PROJECT_ICON.to_string()
}

fn default_true() -> bool {
    true
}

/// `format.yaml` — descriptor format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatLayer {
    pub version: u32,
}

/// Project maintainer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub organization: Option<String>,
}

impl fmt::Display for Maintainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.organization {
            Some(org) => write!(f, "{} @ {} ({})", self.name, org, self.email),
            None => write!(f, "{} ({})", self.name, self.email),
        }
    }
}

/// `self.yaml` — the project's own identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfLayer {
    pub name: String,
    pub maintainer: Maintainer,
    pub description: String,
    pub version: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

/// `distro.yaml` — the distribution the project tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistroLayer {
    pub name: String,
}

/// `base.yaml` — the base container image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseLayer {
    pub repository: String,
    #[serde(default)]
    pub registry: Option<String>,
    #[serde(default = "default_organization")]
    pub organization: String,
    #[serde(default)]
    pub tag: Option<String>,
}

/// `options.yaml` — behavioral switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionsLayer {
    #[serde(default)]
    pub needs_recipe: bool,
}

/// `template.yaml` — which project template this descriptor instantiates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLayer {
    pub name: String,
    pub version: String,
    #[serde(default = "default_provider")]
    pub provider: String,
}

/// A named external recipe project supplying build context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub repository: String,
    pub branch: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_organization")]
    pub organization: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// One entry of a hook event's ordered command list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub command: String,
    #[serde(default = "default_true")]
    pub required: bool,
}

/// `hooks.yaml` — event name to ordered hook list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HooksLayer {
    pub hooks: BTreeMap<String, Vec<Hook>>,
}

impl HooksLayer {
    /// Hooks registered for `event`; unknown events yield an empty slice.
    pub fn get(&self, event: &str) -> &[Hook] {
        self.hooks.get(event).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Tri-state optional mapping section.
///
/// `Unset` (no file on disk) is distinct from `Empty` (file present with
/// no entries); `Present` always holds at least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Section<T> {
    #[default]
    Unset,
    Empty,
    Present(BTreeMap<String, T>),
}

impl<T> Section<T> {
    /// Build a section from a parsed mapping, collapsing an empty map to
    /// [`Section::Empty`].
    pub fn from_map(map: BTreeMap<String, T>) -> Self {
        if map.is_empty() {
            Section::Empty
        } else {
            Section::Present(map)
        }
    }

    /// Whether the section file was present on disk at all.
    pub fn is_given(&self) -> bool {
        !matches!(self, Section::Unset)
    }

    /// Whether the section holds no entries (unset or explicitly empty).
    pub fn is_empty(&self) -> bool {
        !matches!(self, Section::Present(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Section::Present(map) => map.len(),
            _ => 0,
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        match self {
            Section::Present(map) => map.get(name),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declared entry names, in deterministic order.
    pub fn names(&self) -> Vec<String> {
        match self {
            Section::Present(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        let map = match self {
            Section::Present(map) => Some(map),
            _ => None,
        };
        map.into_iter().flat_map(|m| m.iter())
    }
}

/// The full layer collection of a generation-4 descriptor.
#[derive(Debug, Clone)]
pub struct Layers {
    pub format: FormatLayer,
    pub identity: SelfLayer,
    pub distro: DistroLayer,
    pub base: BaseLayer,
    pub options: OptionsLayer,
    pub template: Option<TemplateLayer>,
    pub recipes: Section<Recipe>,
    pub containers: Section<serde_yaml::Value>,
    pub devcontainers: Section<serde_yaml::Value>,
    pub hooks: HooksLayer,
    /// Caller-defined sections, keyed by file stem, preserved verbatim.
    pub extensions: BTreeMap<String, serde_yaml::Value>,
}
