//! Clone, pull, and submodule operations for cached recipe repositories

use std::path::Path;

use git2::Repository;
use git2::build::RepoBuilder;

use crate::{Error, Result};

/// Clone `url` at `branch` into `dest`, initializing submodules.
pub fn clone_recursive(url: &str, branch: &str, dest: &Path) -> Result<()> {
    tracing::debug!(url, branch, dest = %dest.display(), "cloning repository");
    let repo = RepoBuilder::new()
        .branch(branch)
        .clone(url, dest)
        .map_err(|e| Error::CloneFailed {
            url: url.to_string(),
            message: e.message().to_string(),
        })?;
    update_submodules_in(&repo)
}

/// Fetch `branch` from origin and fast-forward the local branch to it.
///
/// A history that cannot be fast-forwarded is an error; the recipe cache
/// is never merged.
pub fn pull_branch(path: &Path, branch: &str) -> Result<()> {
    let repo = Repository::open(path)?;

    let mut remote = repo
        .find_remote("origin")
        .map_err(|_| Error::RemoteNotFound {
            name: "origin".to_string(),
        })?;

    remote
        .fetch(&[branch], None, None)
        .map_err(|e| Error::PullFailed {
            message: format!("Fetch failed: {}", e.message()),
        })?;

    let fetch_head = repo
        .find_reference("FETCH_HEAD")
        .map_err(|e| Error::PullFailed {
            message: format!("Could not find FETCH_HEAD: {}", e.message()),
        })?;
    let fetch_commit = fetch_head.peel_to_commit().map_err(|e| Error::PullFailed {
        message: format!("Could not resolve FETCH_HEAD: {}", e.message()),
    })?;

    let (merge_analysis, _) =
        repo.merge_analysis(&[&repo.find_annotated_commit(fetch_commit.id())?])?;

    if merge_analysis.is_up_to_date() {
        return Ok(());
    }

    if merge_analysis.is_fast_forward() {
        let refname = format!("refs/heads/{}", branch);
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(
            fetch_commit.id(),
            &format!("pull: fast-forward to {}", fetch_commit.id()),
        )?;
        repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))?;
        return Ok(());
    }

    Err(Error::CannotFastForward {
        message: format!(
            "Cannot fast-forward {} to {}. Manual intervention required.",
            branch,
            fetch_commit.id()
        ),
    })
}

/// Update all submodules of the repository at `path`.
pub fn update_submodules(path: &Path) -> Result<()> {
    let repo = Repository::open(path)?;
    update_submodules_in(&repo)
}

/// HEAD commit SHA of the repository at `path`.
pub fn head_sha(path: &Path) -> Result<String> {
    let repo = Repository::open(path)?;
    let head = repo.head().map_err(|_| Error::NoCommits {
        path: path.to_path_buf(),
    })?;
    Ok(head.peel_to_commit()?.id().to_string())
}

fn update_submodules_in(repo: &Repository) -> Result<()> {
    for mut submodule in repo.submodules()? {
        submodule.update(true, None)?;
    }
    Ok(())
}
