//! Hermetic git repository fixtures built on `git2`.
//!
//! All helpers panic on failure; they are test scaffolding, not library
//! code.

use std::fs;
use std::path::Path;

use git2::{Oid, Repository, RepositoryInitOptions, Signature};

/// Initialise a real git repository with `main` as the initial branch.
pub fn init_repo(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(path, &opts).unwrap_or_else(|e| {
        panic!("init_repo: failed to init repository at {}: {e}", path.display())
    })
}

/// Write `content` to `relative` inside the work tree and commit it.
///
/// Creates the initial commit if the repository has no history yet.
pub fn commit_file(repo: &Repository, relative: &str, content: &str, message: &str) -> Oid {
    let workdir = repo
        .workdir()
        .unwrap_or_else(|| panic!("commit_file: bare repository"));
    let file_path = workdir.join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("commit_file: failed to create {}: {e}", parent.display()));
    }
    fs::write(&file_path, content)
        .unwrap_or_else(|e| panic!("commit_file: failed to write {relative}: {e}"));

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(relative)).unwrap();
    index.write().unwrap();
    commit_index(repo, message)
}

/// Stage everything in the work tree and commit it.
pub fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    commit_index(repo, message)
}

fn commit_index(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let signature = Signature::now("Test User", "test@test.com").unwrap();
    let parents: Vec<_> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<_> = parents.iter().collect();

    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parent_refs,
    )
    .unwrap()
}

/// Create a lightweight tag pointing at HEAD.
pub fn tag_head(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.tag_lightweight(name, head.as_object(), false)
        .unwrap_or_else(|e| panic!("tag_head: failed to tag {name}: {e}"));
}

/// Add an `origin` remote pointing at `url`.
pub fn add_origin(repo: &Repository, url: &str) {
    repo.remote("origin", url)
        .unwrap_or_else(|e| panic!("add_origin: failed to add remote: {e}"));
}
