//! The descriptor: a unified, read-only view over one on-disk project.
//!
//! Construction classifies the project into a schema generation, parses
//! the matching metadata format, snapshots version-control facts, and
//! runs the generation-4 consistency checks. Everything after that is a
//! projection: accessors, path derivation, image naming, and lazy recipe
//! resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use descriptor_git::{NO_VERSION, RepositoryFacts};

use crate::deps;
use crate::layers::{
    BaseLayer, HooksLayer, Layers, OptionsLayer, Recipe, Section, TemplateLayer,
    DEFAULT_GIT_PROVIDER, DEFAULT_ORGANIZATION,
};
use crate::loader::{self, Generation};
use crate::naming;
use crate::recipe::{self, ResolverConfig};
use crate::registry::RegistryClient;
use crate::templates::{self, PathTemplate};
use crate::{Error, Result};

/// Recipe name assumed when the caller supplies no selector.
pub const DEFAULT_RECIPE_NAME: &str = "default";

/// Version name reported when no version-control facts are available.
pub const DEFAULT_VERSION_NAME: &str = "latest";

/// Data sources that contributed to a descriptor, in activation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    Filesystem,
    Git,
    Descriptor,
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Adapter::Filesystem => "fs",
            Adapter::Git => "git",
            Adapter::Descriptor => "descriptor",
        };
        write!(f, "{label}")
    }
}

/// Caller-controlled knobs for descriptor construction.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Explicit recipe selector; validated against the recipes section.
    pub recipe: Option<String>,
    /// Recipe cache configuration.
    pub resolver: ResolverConfig,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            recipe: None,
            resolver: ResolverConfig::from_env(),
        }
    }
}

/// Parsed metadata, per generation family.
#[derive(Debug, Clone)]
enum Source {
    /// Generations 1-3: the flat uppercase key/value map.
    Legacy(BTreeMap<String, String>),
    /// Generation 4: the typed layer collection.
    Layered(Box<Layers>),
}

/// One on-disk project, loaded and validated.
#[derive(Debug)]
pub struct Descriptor {
    path: PathBuf,
    generation: Generation,
    adapters: Vec<Adapter>,
    facts: Option<RepositoryFacts>,
    source: Source,
    selected_recipe: Option<String>,
    custom_recipe_dir: Option<PathBuf>,
    recipe_branch: Option<String>,
    resolver: ResolverConfig,
}

impl Descriptor {
    /// Load the project at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(path, LoadOptions::default())
    }

    /// Load the project at `path`.
    pub fn load(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let generation = Generation::classify(&path)?;
        tracing::debug!(path = %path.display(), generation = %generation, "loading project descriptor");

        let source = match generation {
            Generation::V4 => Source::Layered(Box::new(loader::load_layers(&path)?)),
            _ => Source::Legacy(loader::parse_legacy_metadata(&path)?),
        };

        let mut adapters = vec![Adapter::Filesystem];
        let facts = if path.join(".git").exists() {
            adapters.push(Adapter::Git);
            Some(RepositoryFacts::gather(&path)?)
        } else {
            None
        };
        adapters.push(Adapter::Descriptor);

        let descriptor = Self {
            path,
            generation,
            adapters,
            facts,
            source,
            selected_recipe: options.recipe,
            custom_recipe_dir: None,
            recipe_branch: None,
            resolver: options.resolver,
        };
        descriptor.check_consistency()?;
        Ok(descriptor)
    }

    /// Fail fast on recipe-related contradictions before handing the
    /// descriptor to the caller.
    fn check_consistency(&self) -> Result<()> {
        let needs_recipe = self.needs_recipe();

        if let Source::Layered(layers) = &self.source {
            if needs_recipe && layers.recipes.is_empty() {
                return Err(Error::Inconsistent {
                    message: "the project needs a recipe but declares none".to_string(),
                });
            }
            if !needs_recipe && !layers.recipes.is_empty() {
                return Err(Error::Inconsistent {
                    message: "the project declares recipes but is set not to need one"
                        .to_string(),
                });
            }
        }

        if let Some(name) = &self.selected_recipe {
            if !needs_recipe {
                return Err(Error::RecipeNotSelectable { name: name.clone() });
            }
            let available = self.available_recipe_names();
            if !available.contains(name) {
                return Err(Error::UnknownRecipe {
                    name: name.clone(),
                    available,
                });
            }
        }
        Ok(())
    }

    fn available_recipe_names(&self) -> Vec<String> {
        match &self.source {
            Source::Layered(layers) => layers.recipes.names(),
            // legacy recipes are synthesized from metadata keys under one name
            Source::Legacy(_) => vec![DEFAULT_RECIPE_NAME.to_string()],
        }
    }

    // ---- identity ----------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn adapters(&self) -> &[Adapter] {
        &self.adapters
    }

    /// Version-control facts, if the project is a git repository.
    pub fn facts(&self) -> Option<&RepositoryFacts> {
        self.facts.as_ref()
    }

    /// The project's resolved name, lowercased.
    ///
    /// Legacy generations fall back from the `NAME` key to the VCS
    /// repository name to the directory basename; generation 4 uses the
    /// self layer exclusively.
    pub fn name(&self) -> String {
        let name = match &self.source {
            Source::Layered(layers) => layers.identity.name.clone(),
            Source::Legacy(metadata) => metadata
                .get("NAME")
                .cloned()
                .or_else(|| self.facts.as_ref().and_then(|f| f.repository.clone()))
                .unwrap_or_else(|| {
                    self.path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                }),
        };
        name.to_lowercase()
    }

    /// Declared semantic version of the project.
    pub fn version(&self) -> String {
        match &self.source {
            Source::Layered(layers) => layers.identity.version.clone(),
            Source::Legacy(metadata) => metadata
                .get("VERSION")
                .cloned()
                .unwrap_or_else(|| NO_VERSION.to_string()),
        }
    }

    /// Project type: the key into the template tables.
    pub fn project_type(&self) -> Result<String> {
        match &self.source {
            Source::Layered(layers) => Ok(self.template_layer(layers)?.name.clone()),
            Source::Legacy(metadata) => Ok(metadata["TYPE"].clone()),
        }
    }

    /// Template version of the project type.
    pub fn type_version(&self) -> Result<String> {
        match &self.source {
            Source::Layered(layers) => Ok(self.template_layer(layers)?.version.clone()),
            Source::Legacy(metadata) => Ok(metadata["TYPE_VERSION"].clone()),
        }
    }

    fn template_layer<'a>(&self, layers: &'a Layers) -> Result<&'a TemplateLayer> {
        layers.template.as_ref().ok_or_else(|| {
            Error::malformed(format!(
                "the project '{}' does not declare a template",
                self.path.display()
            ))
        })
    }

    /// Descriptor format version (generation 4 only).
    pub fn format(&self) -> Result<u32> {
        match &self.source {
            Source::Layered(layers) => Ok(layers.format.version),
            Source::Legacy(_) => Err(self.legacy_gap("format")),
        }
    }

    pub fn description(&self) -> Result<String> {
        match &self.source {
            Source::Layered(layers) => Ok(layers.identity.description.clone()),
            Source::Legacy(_) => Err(self.legacy_gap("description")),
        }
    }

    pub fn maintainer(&self) -> Result<String> {
        match &self.source {
            Source::Layered(layers) => Ok(layers.identity.maintainer.to_string()),
            Source::Legacy(_) => Err(self.legacy_gap("maintainer")),
        }
    }

    pub fn icon(&self) -> Result<String> {
        match &self.source {
            Source::Layered(layers) => Ok(layers.identity.icon.clone()),
            Source::Legacy(_) => Err(self.legacy_gap("icon")),
        }
    }

    /// Distribution the project tracks.
    ///
    /// Legacy generations derive it from the branch name's first dash
    /// segment, defaulting to `latest` when no facts are available. A
    /// detached HEAD reports the branch sentinel itself.
    pub fn distro(&self) -> String {
        match &self.source {
            Source::Layered(layers) => layers.distro.name.clone(),
            Source::Legacy(_) => self
                .facts
                .as_ref()
                .map(|f| {
                    f.branch
                        .split('-')
                        .next()
                        .unwrap_or(f.branch.as_str())
                        .to_string()
                })
                .unwrap_or_else(|| DEFAULT_VERSION_NAME.to_string()),
        }
    }

    pub fn options(&self) -> OptionsLayer {
        match &self.source {
            Source::Layered(layers) => layers.options,
            Source::Legacy(metadata) => OptionsLayer {
                // no options section pre-generation-4
                needs_recipe: metadata["TYPE"] == "template-exercise",
            },
        }
    }

    pub fn needs_recipe(&self) -> bool {
        self.options().needs_recipe
    }

    pub fn base_info(&self) -> Result<&BaseLayer> {
        match &self.source {
            Source::Layered(layers) => Ok(&layers.base),
            Source::Legacy(_) => Err(self.legacy_gap("base")),
        }
    }

    pub fn template_info(&self) -> Result<&TemplateLayer> {
        match &self.source {
            Source::Layered(layers) => self.template_layer(layers),
            Source::Legacy(_) => Err(self.legacy_gap("template")),
        }
    }

    /// The full typed layer collection (generation 4 only).
    pub fn layers(&self) -> Result<&Layers> {
        match &self.source {
            Source::Layered(layers) => Ok(layers),
            Source::Legacy(_) => Err(self.legacy_gap("layers")),
        }
    }

    pub fn containers(&self) -> Result<&Section<serde_yaml::Value>> {
        self.layers()
            .map(|l| &l.containers)
            .map_err(|_| self.legacy_gap("containers"))
    }

    pub fn devcontainers(&self) -> Result<&Section<serde_yaml::Value>> {
        self.layers()
            .map(|l| &l.devcontainers)
            .map_err(|_| self.legacy_gap("devcontainers"))
    }

    pub fn hooks(&self) -> Result<&HooksLayer> {
        self.layers()
            .map(|l| &l.hooks)
            .map_err(|_| self.legacy_gap("hooks"))
    }

    /// Flat key/value metadata view.
    ///
    /// Legacy generations return the parsed metadata file; generation 4
    /// synthesizes the compatible keys. Both views carry the project
    /// path under `PATH`.
    pub fn metadata(&self) -> Result<BTreeMap<String, String>> {
        let mut metadata = match &self.source {
            Source::Legacy(metadata) => metadata.clone(),
            Source::Layered(_) => {
                let mut metadata = BTreeMap::new();
                metadata.insert("VERSION".to_string(), self.version());
                metadata.insert("TYPE".to_string(), self.project_type()?);
                metadata.insert("TYPE_VERSION".to_string(), self.type_version()?);
                metadata
            }
        };
        metadata.insert("PATH".to_string(), self.path.display().to_string());
        Ok(metadata)
    }

    /// Container build arguments derived from the layers.
    ///
    /// Legacy generations carry none.
    pub fn build_args(&self) -> Result<BTreeMap<String, String>> {
        let Source::Layered(layers) = &self.source else {
            return Ok(BTreeMap::new());
        };
        let mut args = BTreeMap::new();
        args.insert("DISTRO".to_string(), layers.distro.name.clone());
        args.insert(
            "PROJECT_FORMAT_VERSION".to_string(),
            layers.format.version.to_string(),
        );
        args.insert("PROJECT_NAME".to_string(), self.name());
        args.insert(
            "PROJECT_DESCRIPTION".to_string(),
            layers.identity.description.clone(),
        );
        args.insert(
            "PROJECT_MAINTAINER".to_string(),
            layers.identity.maintainer.to_string(),
        );
        args.insert("PROJECT_ICON".to_string(), layers.identity.icon.clone());
        args.insert(
            "BASE_REPOSITORY".to_string(),
            layers.base.repository.clone(),
        );
        if let Some(tag) = &layers.base.tag {
            args.insert("BASE_TAG".to_string(), tag.clone());
        }
        args.insert(
            "BASE_ORGANIZATION".to_string(),
            layers.base.organization.clone(),
        );
        Ok(args)
    }

    fn legacy_gap(&self, field: &str) -> Error {
        let version = match &self.source {
            Source::Legacy(metadata) => metadata
                .get("TYPE_VERSION")
                .cloned()
                .unwrap_or_else(|| self.generation.to_string()),
            Source::Layered(_) => self.generation.to_string(),
        };
        Error::not_implemented(field, &version)
    }

    // ---- version-control projections ---------------------------------

    /// HEAD commit SHA, or the no-version sentinel.
    pub fn sha(&self) -> String {
        self.facts
            .as_ref()
            .map(|f| f.sha.clone())
            .unwrap_or_else(|| NO_VERSION.to_string())
    }

    /// Tag at HEAD, or the no-version sentinel.
    pub fn head_version(&self) -> String {
        self.facts
            .as_ref()
            .map(|f| f.head_tag.clone())
            .unwrap_or_else(|| NO_VERSION.to_string())
    }

    /// Most recent tag overall, or the no-version sentinel.
    pub fn closest_version(&self) -> String {
        self.facts
            .as_ref()
            .map(|f| f.closest_tag.clone())
            .unwrap_or_else(|| NO_VERSION.to_string())
    }

    /// Branch-or-tag name identifying the checked-out version.
    pub fn version_name(&self) -> String {
        match &self.facts {
            Some(facts) if facts.is_detached() => facts.head_tag.clone(),
            Some(facts) => facts.branch.clone(),
            None => DEFAULT_VERSION_NAME.to_string(),
        }
    }

    /// [`Descriptor::version_name`] made safe for use in an image tag.
    pub fn safe_version_name(&self) -> String {
        naming::sanitize_version(&self.version_name())
    }

    /// HTTPS-normalized origin URL, if the repository has one.
    pub fn url(&self) -> Option<String> {
        self.facts.as_ref().and_then(|f| f.origin_https_url.clone())
    }

    pub fn is_clean(&self) -> bool {
        self.facts.as_ref().map(|f| f.is_clean()).unwrap_or(true)
    }

    pub fn is_dirty(&self) -> bool {
        !self.is_clean()
    }

    pub fn is_detached(&self) -> bool {
        self.facts.as_ref().map(|f| f.is_detached()).unwrap_or(false)
    }

    pub fn is_release(&self) -> bool {
        self.facts.as_ref().map(|f| f.is_release()).unwrap_or(false)
    }

    // ---- recipes -----------------------------------------------------

    /// Declared recipes section (generation 4 only).
    pub fn recipes(&self) -> Result<&Section<Recipe>> {
        self.layers()
            .map(|l| &l.recipes)
            .map_err(|_| self.legacy_gap("recipes"))
    }

    /// Name of the recipe in effect: the explicit selector, or `default`.
    pub fn selected_recipe_name(&self) -> &str {
        self.selected_recipe
            .as_deref()
            .unwrap_or(DEFAULT_RECIPE_NAME)
    }

    /// The active recipe record, with any branch override applied.
    pub fn recipe_info(&self) -> Result<Recipe> {
        if !self.needs_recipe() {
            return Err(Error::RecipeNotSelectable {
                name: self.selected_recipe_name().to_string(),
            });
        }

        let mut recipe = match &self.source {
            Source::Layered(layers) => {
                let name = self.selected_recipe_name();
                layers
                    .recipes
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::UnknownRecipe {
                        name: name.to_string(),
                        available: layers.recipes.names(),
                    })?
            }
            // legacy template-exercise projects carry the recipe inline;
            // RECIPE_REPOSITORY may be qualified as "organization/repository"
            Source::Legacy(metadata) => {
                let key = |name: &str| {
                    metadata.get(name).cloned().ok_or_else(|| {
                        Error::malformed(format!(
                            "the project '{}' does not declare the key '{name}'",
                            self.path.display()
                        ))
                    })
                };
                let repository = key("RECIPE_REPOSITORY")?;
                let (organization, repository) = match repository.split_once('/') {
                    Some((organization, repository)) => {
                        (organization.to_string(), repository.to_string())
                    }
                    None => (DEFAULT_ORGANIZATION.to_string(), repository),
                };
                Recipe {
                    repository,
                    branch: key("RECIPE_BRANCH")?,
                    provider: DEFAULT_GIT_PROVIDER.to_string(),
                    organization,
                    location: Some(key("RECIPE_LOCATION")?),
                }
            }
        };
        if let Some(branch) = &self.recipe_branch {
            recipe.branch = branch.clone();
        }
        Ok(recipe)
    }

    /// On-disk directory of the active recipe project.
    pub fn recipe_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.custom_recipe_dir {
            return Ok(dir.clone());
        }
        Ok(self.resolver.recipe_project_dir(&self.recipe_info()?))
    }

    /// Override the recipe directory; overridden recipes are never
    /// cloned or auto-updated.
    pub fn set_recipe_dir(&mut self, dir: impl Into<PathBuf>) {
        self.custom_recipe_dir = Some(dir.into());
    }

    /// Override the branch of the active recipe.
    pub fn set_recipe_branch(&mut self, branch: impl Into<String>) {
        self.recipe_branch = Some(branch.into());
    }

    /// Materialize the active recipe on disk, cloning if absent.
    pub fn ensure_recipe_exists(&self) -> Result<()> {
        if !self.needs_recipe() {
            return Ok(());
        }
        let recipe_dir = self.recipe_dir()?;
        if recipe_dir.is_dir() {
            return Ok(());
        }
        if self.custom_recipe_dir.is_some() {
            return Err(Error::RecipeNotFound { path: recipe_dir });
        }

        recipe::clone_recipe(&self.recipe_info()?, &self.resolver)?;
        if !recipe_dir.is_dir() {
            return Err(Error::RecipeNotFound { path: recipe_dir });
        }
        Ok(())
    }

    /// Update the cached recipe; returns whether an update was applied.
    pub fn update_recipe(&self) -> Result<bool> {
        if !self.needs_recipe() || self.custom_recipe_dir.is_some() {
            return Ok(false);
        }
        recipe::update_recipe(&self.recipe_info()?, &self.resolver)
    }

    /// Load the active recipe as a descriptor of its own.
    pub fn recipe(&self) -> Result<Descriptor> {
        let recipe_dir = self.recipe_dir()?;
        Descriptor::load(
            recipe_dir,
            LoadOptions {
                recipe: None,
                resolver: self.resolver.clone(),
            },
        )
    }

    /// Path of the Dockerfile driving the project's build.
    ///
    /// Recipe-backed projects delegate to the recipe directory.
    pub fn dockerfile(&self) -> Result<PathBuf> {
        let root = if self.needs_recipe() {
            self.recipe_dir()?
        } else {
            self.path.clone()
        };
        let dockerfile = root.join("Dockerfile");
        if !dockerfile.is_file() {
            return Err(Error::malformed(format!(
                "no Dockerfile found at '{}'",
                dockerfile.display()
            )));
        }
        Ok(dockerfile)
    }

    // ---- dependency lists --------------------------------------------

    pub fn apt_dependencies(&self) -> Result<Vec<String>> {
        deps::apt_dependencies(&self.path)
    }

    pub fn py3_dependencies(&self) -> Result<Vec<String>> {
        deps::py3_dependencies(&self.path)
    }

    pub fn py3_extra_dependencies(&self) -> Result<Vec<String>> {
        deps::py3_extra_dependencies(&self.path)
    }

    // ---- launchers ---------------------------------------------------

    /// Names of the project's launchers, merged with the recipe's when
    /// the project is recipe-backed.
    pub fn launchers(&self) -> Result<Vec<String>> {
        let version = self.type_version()?;
        // launchers directories only exist from template version 2 on;
        // unparsable versions never have them
        if version.parse::<i32>().unwrap_or(-1) < 2 {
            return Err(self.legacy_gap("launchers"));
        }

        let mut names = launcher_names(&self.path.join("launchers"))?;
        if self.needs_recipe() {
            names.extend(launcher_names(&self.recipe_dir()?.join("launchers"))?);
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    // ---- path derivation ---------------------------------------------

    /// Source-code mount pairs for this project.
    pub fn code_paths(&self, root: Option<&Path>) -> Result<(Vec<PathBuf>, Vec<String>)> {
        let template = self.lookup(templates::source_mapping)?;
        self.expand_template(&template, root)
    }

    /// Launcher mount pairs for this project.
    pub fn launch_paths(&self, root: Option<&Path>) -> Result<(Vec<PathBuf>, Vec<String>)> {
        let template = self.lookup(templates::launcher_mapping)?;
        self.expand_template(&template, root)
    }

    /// Asset mount pairs for this project.
    pub fn assets_paths(&self, root: Option<&Path>) -> Result<(Vec<PathBuf>, Vec<String>)> {
        let template = self.lookup(templates::assets_mapping)?;
        self.expand_template(&template, root)
    }

    /// Documentation directory of this project.
    pub fn docs_path(&self) -> Result<PathBuf> {
        let ptype = self.project_type()?;
        let version = self.type_version()?;
        let relative = templates::docs_mapping(&ptype, &version).ok_or_else(|| {
            Error::UnsupportedTemplate {
                ptype,
                version,
                path: self.path.clone(),
            }
        })?;
        Ok(self.path.join(relative))
    }

    fn lookup(
        &self,
        table: fn(&str, &str, &str) -> Option<PathTemplate>,
    ) -> Result<PathTemplate> {
        let ptype = self.project_type()?;
        let version = self.type_version()?;
        table(&ptype, &version, &self.name()).ok_or_else(|| Error::UnsupportedTemplate {
            ptype,
            version,
            path: self.path.clone(),
        })
    }

    /// Resolve a path template against a filesystem root, expanding
    /// directory globs into parallel source/destination lists.
    fn expand_template(
        &self,
        template: &PathTemplate,
        root: Option<&Path>,
    ) -> Result<(Vec<PathBuf>, Vec<String>)> {
        let root = root.unwrap_or(&self.path);

        if !template.is_glob() {
            let source = if template.source.is_empty() {
                root.to_path_buf()
            } else {
                root.join(&template.source)
            };
            return Ok((vec![source], vec![template.destination.clone()]));
        }

        let prefix = template
            .source
            .trim_end_matches(templates::WILDCARD)
            .trim_end_matches('/');
        let glob_root = if prefix.is_empty() {
            root.to_path_buf()
        } else {
            root.join(prefix)
        };

        let mut sources = Vec::new();
        let mut destinations = Vec::new();
        if glob_root.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(&glob_root)
                .map_err(|e| descriptor_fs::Error::io(glob_root.clone(), e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_dir())
                .collect();
            entries.sort();
            for entry in entries {
                if let Some(stem) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) {
                    destinations.push(format!("{}/{stem}", template.destination));
                    sources.push(entry);
                }
            }
        }
        Ok((sources, destinations))
    }

    // ---- image naming ------------------------------------------------

    /// Compose the canonical container image tag for this project.
    pub fn image(&self, arch: &str, registry: &str, owner: &str, opts: &ImageOptions) -> Result<String> {
        naming::assert_canonical_arch(arch)?;
        let version = opts
            .version
            .clone()
            .unwrap_or_else(|| self.safe_version_name());

        let mut tag = version;
        if let Some(extra) = &opts.extra {
            tag.push('-');
            tag.push_str(extra);
        }
        if opts.loop_ {
            tag.push_str("-LOOP");
        }
        if opts.docs {
            tag.push_str("-docs");
        }
        Ok(format!("{registry}/{owner}/{}:{tag}-{arch}", self.name()))
    }

    /// Image tag for the VSCode-flavored build.
    pub fn image_vscode(&self, arch: &str, registry: &str, owner: &str, opts: &ImageOptions) -> Result<String> {
        self.image(
            arch,
            registry,
            owner,
            &ImageOptions {
                extra: Some("vscode".to_string()),
                ..opts.clone()
            },
        )
    }

    /// Image tag for the VNC-flavored build.
    pub fn image_vnc(&self, arch: &str, registry: &str, owner: &str, opts: &ImageOptions) -> Result<String> {
        self.image(
            arch,
            registry,
            owner,
            &ImageOptions {
                extra: Some("vnc".to_string()),
                ..opts.clone()
            },
        )
    }

    /// Release image tag; requires a clean tree and a tag at HEAD.
    pub fn image_release(
        &self,
        arch: &str,
        registry: &str,
        owner: &str,
        opts: &ImageOptions,
    ) -> Result<String> {
        if !self.is_release() {
            return Err(Error::NotReleased);
        }
        let version = naming::sanitize_version(&self.head_version());
        self.image(
            arch,
            registry,
            owner,
            &ImageOptions {
                version: Some(version),
                ..opts.clone()
            },
        )
    }

    /// Arch-less manifest reference.
    pub fn manifest(&self, registry: &str, owner: &str, version: Option<&str>) -> String {
        let version = version
            .map(str::to_string)
            .unwrap_or_else(|| self.safe_version_name());
        format!("{registry}/{owner}/{}:{version}", self.name())
    }

    /// Fetch remote registry metadata for the project's image.
    pub fn remote_image_metadata(
        &self,
        arch: &str,
        registry: &str,
        owner: &str,
    ) -> Result<serde_json::Value> {
        naming::assert_canonical_arch(arch)?;
        let tag = format!("{}-{arch}", self.safe_version_name());
        RegistryClient::default().image_metadata(registry, owner, &self.name(), &tag)
    }
}

/// Optional components of an image tag.
#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    /// Version component; defaults to the sanitized branch-or-tag name.
    pub version: Option<String>,
    /// Append the `-LOOP` marker.
    pub loop_: bool,
    /// Append the `-docs` marker.
    pub docs: bool,
    /// Extra tag component inserted before the markers.
    pub extra: Option<String>,
}

/// Launcher names declared in a `launchers/` directory.
///
/// A launcher is an executable file or a file opening with a shebang;
/// names are file stems. A missing directory yields no launchers.
fn launcher_names(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| descriptor_fs::Error::io(dir, e))? {
        let entry = entry.map_err(|e| descriptor_fs::Error::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() || !is_launcher(&path) {
            continue;
        }
        if let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) {
            names.push(stem);
        }
    }
    names.sort();
    Ok(names)
}

fn is_launcher(path: &Path) -> bool {
    if is_executable(path) {
        return true;
    }
    fs::read_to_string(path)
        .map(|content| content.starts_with("#!"))
        .unwrap_or(false)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}
