//! Recipe cache resolution: cache paths, cloning, and rate-limited updates.
//!
//! Recipes are cached on disk under `<recipes_root>/<repository>/<branch>`,
//! with the recipe project itself at the recipe's `location` inside that
//! checkout. An update-check stamp file inside the recipe project gates
//! how often the remote is consulted.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use descriptor_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::layers::Recipe;
use crate::{Error, Result};

/// Update-check stamp file inside the recipe project directory.
pub const UPDATE_CHECK_FILE: &str = ".updates-check";

/// Re-check window; inside it the remote is never consulted.
pub const UPDATE_CHECK_WINDOW: Duration = Duration::from_secs(5 * 60);

const PULL_ATTEMPTS: u32 = 3;
const PULL_RETRY_DELAY: Duration = Duration::from_secs(4);

/// Environment override for the tool home directory.
pub const HOME_ENV: &str = "DESCRIPTOR_HOME";

/// Environment override for the recipe cache root.
pub const RECIPES_ENV: &str = "DESCRIPTOR_RECIPES";

/// Explicit configuration for the recipe resolver.
///
/// Constructed once and threaded into the descriptor; call sites never
/// read ambient process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Root directory of the on-disk recipe cache.
    pub recipes_root: PathBuf,
}

impl ResolverConfig {
    pub fn new(recipes_root: impl Into<PathBuf>) -> Self {
        Self {
            recipes_root: recipes_root.into(),
        }
    }

    /// Resolve from the environment: `DESCRIPTOR_RECIPES`, else
    /// `DESCRIPTOR_HOME`/recipes, else `~/.descriptor/recipes`.
    pub fn from_env() -> Self {
        let home = std::env::var_os(HOME_ENV).map(PathBuf::from).unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".descriptor")
        });
        let recipes_root = std::env::var_os(RECIPES_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("recipes"));
        Self { recipes_root }
    }

    /// Root of the cached checkout for a recipe: `<root>/<repository>/<branch>`.
    pub fn recipe_repo_dir(&self, recipe: &Recipe) -> PathBuf {
        self.recipes_root
            .join(&recipe.repository)
            .join(&recipe.branch)
    }

    /// Directory of the recipe project inside the cached checkout.
    pub fn recipe_project_dir(&self, recipe: &Recipe) -> PathBuf {
        let repo_dir = self.recipe_repo_dir(recipe);
        match recipe.location.as_deref().map(|l| l.trim_matches('/')) {
            Some(location) if !location.is_empty() => repo_dir.join(location),
            _ => repo_dir,
        }
    }
}

/// Contents of the update-check stamp file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStamp {
    /// Last known remote HEAD SHA.
    pub remote: String,
}

/// Clone the recipe repository into its cache slot.
pub fn clone_recipe(recipe: &Recipe, config: &ResolverConfig) -> Result<()> {
    let repo_dir = config.recipe_repo_dir(recipe);
    let url = format!(
        "https://{}/{}/{}",
        recipe.provider, recipe.organization, recipe.repository
    );
    tracing::info!(repository = %recipe.repository, branch = %recipe.branch, "downloading recipe");
    descriptor_git::clone_recursive(&url, &recipe.branch, &repo_dir)?;
    tracing::info!(repository = %recipe.repository, "recipe downloaded");
    Ok(())
}

/// Update the cached recipe if the remote has moved.
///
/// Returns whether an update was actually applied. Inside the 5-minute
/// window (or with an unreadable stamp or unreachable remote) the call is
/// a policy no-op returning `false`.
pub fn update_recipe(recipe: &Recipe, config: &ResolverConfig) -> Result<bool> {
    let recipe_dir = config.recipe_project_dir(recipe);
    if !recipe_dir.is_dir() {
        return Err(Error::RecipeNotFound { path: recipe_dir });
    }
    // git operations run on the checkout root; the stamp lives in the
    // recipe project directory
    let repo_dir = config.recipe_repo_dir(recipe);

    tracing::debug!(dir = %recipe_dir.display(), "checking whether the recipe needs an update");
    if !needs_update(recipe, &recipe_dir, &repo_dir)? {
        tracing::info!("recipe is up to date");
        return Ok(false);
    }

    tracing::info!(dir = %recipe_dir.display(), "recipe has updates available, pulling");
    pull_with_retries(&repo_dir, &recipe.branch)?;
    descriptor_git::update_submodules(&repo_dir)?;

    let sha = descriptor_git::head_sha(&repo_dir)?;
    write_stamp(&recipe_dir, &sha)?;
    tracing::info!("recipe successfully updated");
    Ok(true)
}

fn pull_with_retries(repo_dir: &Path, branch: &str) -> Result<()> {
    let mut last_error = None;
    for attempt in 1..=PULL_ATTEMPTS {
        match descriptor_git::pull_branch(repo_dir, branch) {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::warn!(
                    attempt,
                    error = %e,
                    "recipe pull failed{}",
                    if attempt < PULL_ATTEMPTS { ", retrying" } else { "" }
                );
                last_error = Some(e);
                if attempt < PULL_ATTEMPTS {
                    std::thread::sleep(PULL_RETRY_DELAY);
                }
            }
        }
    }
    // all attempts exhausted; propagate the last failure
    Err(last_error
        .map(Error::Git)
        .unwrap_or_else(|| Error::malformed("recipe pull failed without an error")))
}

/// Decide whether a remote comparison is due and whether it reports drift.
fn needs_update(recipe: &Recipe, recipe_dir: &Path, repo_dir: &Path) -> Result<bool> {
    let stamp_path = recipe_dir.join(UPDATE_CHECK_FILE);

    if !stamp_path.is_file() {
        // first sighting: record the local SHA and skip the remote
        let sha = descriptor_git::head_sha(repo_dir)?;
        write_stamp(recipe_dir, &sha)?;
        return Ok(false);
    }

    let fresh = stamp_age(&stamp_path)
        .map(|age| age < UPDATE_CHECK_WINDOW)
        .unwrap_or(false);
    if fresh {
        tracing::debug!("update check skipped, cache is fresh");
        return Ok(false);
    }

    let stamp_content = std::fs::read_to_string(&stamp_path)
        .map_err(|e| descriptor_fs::Error::io(stamp_path.clone(), e))?;
    let Ok(stamp) = serde_json::from_str::<UpdateStamp>(&stamp_content) else {
        // unreadable stamp: policy skip
        return Ok(false);
    };

    let remote_sha = match remote_branch_sha(recipe) {
        Ok(sha) => sha,
        Err(e @ Error::UnsupportedProvider { .. }) => return Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "could not fetch remote SHA, skipping update check");
            return Ok(false);
        }
    };

    let drifted = stamp.remote != remote_sha;
    // rewrite to reset the check window, keeping the recorded SHA
    write_stamp(recipe_dir, &stamp.remote)?;
    Ok(drifted)
}

fn stamp_age(stamp_path: &Path) -> Option<Duration> {
    let modified = std::fs::metadata(stamp_path).ok()?.modified().ok()?;
    SystemTime::now().duration_since(modified).ok()
}

/// Record the last-checked remote SHA in the stamp file.
pub fn write_stamp(recipe_dir: &Path, sha: &str) -> Result<()> {
    let stamp = UpdateStamp {
        remote: sha.to_string(),
    };
    let content = serde_json::to_string(&stamp).map_err(|e| Error::Malformed {
        message: format!("cannot serialize update stamp: {e}"),
    })?;
    let path = NormalizedPath::new(recipe_dir.join(UPDATE_CHECK_FILE));
    descriptor_fs::io::write_text(&path, &content)?;
    Ok(())
}

/// HEAD SHA of the remote branch, via the provider's REST API.
///
/// Only `github.com` has an implementation; other providers are rejected.
fn remote_branch_sha(recipe: &Recipe) -> Result<String> {
    if recipe.provider != "github.com" {
        return Err(Error::UnsupportedProvider {
            provider: recipe.provider.clone(),
        });
    }

    let url = format!(
        "https://api.github.com/repos/{}/{}/branches/{}",
        recipe.organization, recipe.repository, recipe.branch
    );
    tracing::info!(%url, "fetching remote SHA");
    let response = reqwest::blocking::Client::new()
        .get(&url)
        .header(reqwest::header::USER_AGENT, "descriptor-core")
        .send()?
        .error_for_status()?;
    let payload: serde_json::Value = response.json()?;
    payload["commit"]["sha"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::malformed(format!("unexpected branch payload from '{url}'")))
}
