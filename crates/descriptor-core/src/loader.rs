//! Schema classification and on-disk parsing.
//!
//! Four descriptor generations coexist on disk. Classification is a pure
//! function over filesystem markers; the recognizers are mutually
//! exclusive by construction:
//!
//! - **V4**: a `descriptor/` directory inside the project root.
//! - **V3**: a `.descriptor` metadata file plus the companion
//!   `dependencies-py3.extra.txt`.
//! - **V1**: a `.descriptor` file, no companion, plus the legacy
//!   `launch.sh` script and `code/` directory.
//! - **V2**: a `.descriptor` file and neither of the above.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use descriptor_fs::{ConfigStore, NormalizedPath};
use serde::de::DeserializeOwned;

use crate::layers::{
    BaseLayer, DistroLayer, FormatLayer, HooksLayer, Layers, OptionsLayer, Recipe, Section,
    SelfLayer, TemplateLayer,
};
use crate::{Error, Result};

/// Generation-4 marker directory.
pub const DESCRIPTOR_DIR: &str = "descriptor";

/// Generation-1–3 metadata file.
pub const LEGACY_DESCRIPTOR_FILE: &str = ".descriptor";

/// Generation-3 companion dependency file.
pub const EXTRA_DEPS_FILE: &str = "dependencies-py3.extra.txt";

/// Generation-1 legacy launch script.
pub const LEGACY_LAUNCH_SCRIPT: &str = "launch.sh";

/// Generation-1 legacy code directory.
pub const LEGACY_CODE_DIR: &str = "code";

/// Layer files every generation-4 descriptor must carry.
const REQUIRED_LAYERS: [&str; 4] = ["format", "self", "distro", "base"];

/// Optional layer files the loader knows how to type.
const KNOWN_OPTIONAL_LAYERS: [&str; 6] = [
    "options",
    "template",
    "recipes",
    "containers",
    "devcontainers",
    "hooks",
];

/// Descriptor schema generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    V1,
    V2,
    V3,
    V4,
}

impl Generation {
    /// Classify the project at `path` into exactly one generation.
    pub fn classify(path: &Path) -> Result<Self> {
        let layers_dir = path.join(DESCRIPTOR_DIR);
        if layers_dir.is_dir() {
            return Ok(Generation::V4);
        }
        if layers_dir.exists() {
            return Err(Error::malformed(format!(
                "The path '{}' must be a directory",
                layers_dir.display()
            )));
        }

        if path.join(LEGACY_DESCRIPTOR_FILE).is_file() {
            if path.join(EXTRA_DEPS_FILE).is_file() {
                return Ok(Generation::V3);
            }
            if path.join(LEGACY_LAUNCH_SCRIPT).is_file() && path.join(LEGACY_CODE_DIR).is_dir() {
                return Ok(Generation::V1);
            }
            return Ok(Generation::V2);
        }

        Err(Error::NotFound {
            path: path.to_path_buf(),
        })
    }

    /// Numeric label used in messages and legacy format synthesis.
    pub fn number(&self) -> u32 {
        match self {
            Generation::V1 => 1,
            Generation::V2 => 2,
            Generation::V3 => 3,
            Generation::V4 => 4,
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Parse the legacy `.descriptor` file into an uppercase key/value map.
///
/// Comments (`#`-prefixed) and blank lines are ignored; each remaining
/// line splits on the first `=`.
pub fn parse_legacy_metadata(path: &Path) -> Result<BTreeMap<String, String>> {
    let metafile = path.join(LEGACY_DESCRIPTOR_FILE);
    let content = fs::read_to_string(&metafile)
        .map_err(|e| descriptor_fs::Error::io(metafile.clone(), e))?;

    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    if lines.is_empty() {
        return Err(Error::malformed(format!(
            "The metadata file '{}' is empty",
            metafile.display()
        )));
    }

    let mut metadata = BTreeMap::new();
    for line in lines {
        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::malformed(format!(
                "The metadata file '{}' contains an invalid line: '{line}'",
                metafile.display()
            )));
        };
        metadata.insert(key.trim().to_uppercase(), value.trim().to_string());
    }

    validate_legacy_metadata(&metadata, &metafile)?;
    Ok(metadata)
}

/// Keys required for a given legacy TYPE_VERSION.
fn required_keys(type_version: &str) -> Option<&'static [&'static str]> {
    match type_version {
        "1" | "2" | "3" | "4" => Some(&["TYPE", "VERSION"]),
        _ => None,
    }
}

/// Extra keys required for a specific (TYPE, TYPE_VERSION) combination.
fn required_keys_per_type(ptype: &str, type_version: &str) -> &'static [&'static str] {
    match (ptype, type_version) {
        ("template-exercise", "3") => {
            &["NAME", "RECIPE_REPOSITORY", "RECIPE_BRANCH", "RECIPE_LOCATION"]
        }
        _ => &[],
    }
}

fn validate_legacy_metadata(metadata: &BTreeMap<String, String>, metafile: &Path) -> Result<()> {
    let missing_key = |key: &str| {
        Error::malformed(format!(
            "The metadata file '{}' does not contain the key '{key}'",
            metafile.display()
        ))
    };

    let Some(version) = metadata.get("TYPE_VERSION") else {
        return Err(missing_key("TYPE_VERSION"));
    };

    let Some(required) = required_keys(version) else {
        return Err(Error::UnsupportedVersion {
            version: version.clone(),
        });
    };
    for key in required {
        if !metadata.contains_key(*key) {
            return Err(missing_key(key));
        }
    }

    // TYPE is guaranteed present at this point
    let ptype = &metadata["TYPE"];
    for key in required_keys_per_type(ptype, version) {
        if !metadata.contains_key(*key) {
            return Err(missing_key(key));
        }
    }

    Ok(())
}

/// Load the generation-4 layer collection from `<path>/descriptor/`.
pub fn load_layers(path: &Path) -> Result<Layers> {
    let layers_dir = path.join(DESCRIPTOR_DIR);
    let store = ConfigStore::new();

    let format: FormatLayer = load_required_layer(&store, &layers_dir, "format")?;
    let identity: SelfLayer = load_required_layer(&store, &layers_dir, "self")?;
    let distro: DistroLayer = load_required_layer(&store, &layers_dir, "distro")?;
    let base: BaseLayer = load_required_layer(&store, &layers_dir, "base")?;

    let options: OptionsLayer =
        load_optional_layer(&store, &layers_dir, "options")?.unwrap_or_default();
    let template: Option<TemplateLayer> = load_optional_layer(&store, &layers_dir, "template")?;
    let recipes = load_section::<Recipe>(&store, &layers_dir, "recipes")?;
    let containers = load_section::<serde_yaml::Value>(&store, &layers_dir, "containers")?;
    let devcontainers = load_section::<serde_yaml::Value>(&store, &layers_dir, "devcontainers")?;
    let hooks: HooksLayer =
        load_optional_layer(&store, &layers_dir, "hooks")?.unwrap_or_default();

    let extensions = load_extensions(&layers_dir)?;

    Ok(Layers {
        format,
        identity,
        distro,
        base,
        options,
        template,
        recipes,
        containers,
        devcontainers,
        hooks,
        extensions,
    })
}

fn layer_path(layers_dir: &Path, layer: &str) -> NormalizedPath {
    NormalizedPath::new(layers_dir.join(format!("{layer}.yaml")))
}

fn load_required_layer<T: DeserializeOwned>(
    store: &ConfigStore,
    layers_dir: &Path,
    layer: &str,
) -> Result<T> {
    let path = layer_path(layers_dir, layer);
    if !path.is_file() {
        return Err(Error::malformed(format!("The file '{path}' is missing")));
    }
    Ok(store.load(&path)?)
}

fn load_optional_layer<T: DeserializeOwned>(
    store: &ConfigStore,
    layers_dir: &Path,
    layer: &str,
) -> Result<Option<T>> {
    let path = layer_path(layers_dir, layer);
    if !path.exists() {
        return Ok(None);
    }
    if !path.is_file() {
        return Err(Error::malformed(format!(
            "The path '{path}' must be a regular file"
        )));
    }
    Ok(Some(store.load(&path)?))
}

/// Load an optional mapping section, preserving the unset/empty/present
/// distinction. A present file holding `null` counts as explicitly empty.
fn load_section<T: DeserializeOwned>(
    store: &ConfigStore,
    layers_dir: &Path,
    layer: &str,
) -> Result<Section<T>> {
    let parsed: Option<Option<BTreeMap<String, T>>> =
        load_optional_layer(store, layers_dir, layer)?;
    Ok(match parsed {
        None => Section::Unset,
        Some(map) => Section::from_map(map.unwrap_or_default()),
    })
}

/// Any other `*.yaml` file in the descriptor directory becomes an
/// extension section keyed by its file stem.
fn load_extensions(layers_dir: &Path) -> Result<BTreeMap<String, serde_yaml::Value>> {
    let mut extensions = BTreeMap::new();
    let entries =
        fs::read_dir(layers_dir).map_err(|e| descriptor_fs::Error::io(layers_dir, e))?;

    for entry in entries.flatten() {
        let entry_path = NormalizedPath::new(entry.path());
        if entry_path.extension() != Some("yaml") || !entry_path.is_file() {
            continue;
        }
        let Some(stem) = entry_path.file_stem().map(str::to_string) else {
            continue;
        };
        if REQUIRED_LAYERS.contains(&stem.as_str())
            || KNOWN_OPTIONAL_LAYERS.contains(&stem.as_str())
        {
            continue;
        }

        let content = descriptor_fs::io::read_text(&entry_path)?;
        let value: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| descriptor_fs::Error::Parse {
                path: entry_path.to_native(),
                format: "YAML".into(),
                message: e.to_string(),
            })?;
        // an empty file parses as null; keep it as an empty mapping
        let value = match value {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => other,
        };
        extensions.insert(stem, value);
    }

    Ok(extensions)
}
