//! Read-only snapshot of version-control facts for a project directory

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository, Status, StatusOptions};

use crate::url::{normalize_remote_url, remote_url_to_https, repository_name};
use crate::{Error, Result};

/// Sentinel for facts that could not be determined (no commits, no tag, no remote).
pub const NO_VERSION: &str = "ND";

/// Branch sentinel reported when HEAD is detached.
pub const DETACHED_HEAD: &str = "HEAD";

/// Files with this suffix are excluded from the added-untracked count.
pub const RESOLVED_SUFFIX: &str = ".resolved";

/// Version-control facts gathered once when a descriptor is loaded.
///
/// The snapshot is never refreshed; construct a new descriptor to observe
/// repository changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFacts {
    /// Repository name derived from the origin URL, if a remote is set.
    pub repository: Option<String>,
    /// HEAD commit SHA, or [`NO_VERSION`] when the repository has no commits.
    pub sha: String,
    /// Current branch name, or [`DETACHED_HEAD`] when detached.
    pub branch: String,
    /// Tag pointing exactly at HEAD, or [`NO_VERSION`].
    pub head_tag: String,
    /// Most recent tag overall, or [`NO_VERSION`].
    pub closest_tag: String,
    /// Raw origin URL with `.git`/trailing-slash stripped, or [`NO_VERSION`].
    pub origin_url: String,
    /// HTTPS-normalized origin URL, if a remote is set.
    pub origin_https_url: Option<String>,
    /// Number of tracked files with local modifications.
    pub modified_count: usize,
    /// Number of untracked files, excluding [`RESOLVED_SUFFIX`] files.
    pub added_count: usize,
}

impl RepositoryFacts {
    /// Gather facts for the repository rooted at `path`.
    pub fn gather(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::NotARepository {
                    path: PathBuf::from(path),
                }
            } else {
                Error::Git(e)
            }
        })?;

        let (sha, branch) = head_info(&repo)?;
        let (head_tag, closest_tag) = tag_info(&repo, &sha)?;
        let (repository, origin_url, origin_https_url) = origin_info(&repo);
        let (modified_count, added_count) = index_counts(&repo)?;

        Ok(Self {
            repository,
            sha,
            branch,
            head_tag,
            closest_tag,
            origin_url,
            origin_https_url,
            modified_count,
            added_count,
        })
    }

    /// Whether HEAD is detached.
    pub fn is_detached(&self) -> bool {
        self.branch == DETACHED_HEAD
    }

    /// Whether the working tree has no modified or added files.
    pub fn is_clean(&self) -> bool {
        self.modified_count + self.added_count == 0
    }

    /// Whether the repository is in a releasable state: clean working tree
    /// and a tag resolving exactly at HEAD.
    pub fn is_release(&self) -> bool {
        self.is_clean() && self.head_tag != NO_VERSION
    }
}

fn head_info(repo: &Repository) -> Result<(String, String)> {
    match repo.head() {
        Ok(head) => {
            let sha = head.peel_to_commit()?.id().to_string();
            let branch = if head.is_branch() {
                head.shorthand().unwrap_or(DETACHED_HEAD).to_string()
            } else {
                DETACHED_HEAD.to_string()
            };
            Ok((sha, branch))
        }
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            // No commits yet: the symbolic HEAD still names the branch
            let branch = repo
                .find_reference("HEAD")
                .ok()
                .and_then(|r| r.symbolic_target().map(str::to_string))
                .map(|target| {
                    target
                        .strip_prefix("refs/heads/")
                        .unwrap_or(&target)
                        .to_string()
                })
                .unwrap_or_else(|| DETACHED_HEAD.to_string());
            Ok((NO_VERSION.to_string(), branch))
        }
        Err(e) => Err(e.into()),
    }
}

fn tag_info(repo: &Repository, head_sha: &str) -> Result<(String, String)> {
    let mut head_tag = NO_VERSION.to_string();
    let mut tags: Vec<String> = Vec::new();

    for name in repo.tag_names(None)?.iter().flatten() {
        tags.push(name.to_string());
        if head_sha != NO_VERSION
            && let Ok(object) = repo.revparse_single(&format!("refs/tags/{name}"))
            && let Ok(commit) = object.peel_to_commit()
            && commit.id().to_string() == head_sha
        {
            head_tag = name.to_string();
        }
    }

    tags.sort();
    let closest_tag = tags.pop().unwrap_or_else(|| NO_VERSION.to_string());
    Ok((head_tag, closest_tag))
}

fn origin_info(repo: &Repository) -> (Option<String>, String, Option<String>) {
    let url = repo
        .find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(str::to_string));

    match url {
        Some(url) => {
            let normalized = normalize_remote_url(&url).to_string();
            let name = repository_name(&normalized).map(str::to_string);
            let https = Some(remote_url_to_https(&normalized));
            (name, normalized, https)
        }
        None => (None, NO_VERSION.to_string(), None),
    }
}

fn index_counts(repo: &Repository) -> Result<(usize, usize)> {
    let mut tracked_opts = StatusOptions::new();
    tracked_opts.include_untracked(false);
    let modified_count = repo.statuses(Some(&mut tracked_opts))?.len();

    let mut untracked_opts = StatusOptions::new();
    untracked_opts
        .include_untracked(true)
        .recurse_untracked_dirs(true);
    let statuses = repo.statuses(Some(&mut untracked_opts))?;
    let added_count = statuses
        .iter()
        .filter(|entry| entry.status().contains(Status::WT_NEW))
        .filter(|entry| {
            entry
                .path()
                .is_none_or(|p| !p.ends_with(RESOLVED_SUFFIX))
        })
        .count();

    Ok((modified_count, added_count))
}
