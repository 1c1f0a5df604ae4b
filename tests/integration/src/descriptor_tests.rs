//! End-to-end descriptor tests across all four schema generations.
//!
//! These exercise the complete flow: classification -> parsing ->
//! repository facts -> accessors -> image naming, on real on-disk
//! fixtures with real git repositories.

use descriptor_core::{
    Adapter, Descriptor, Error, ImageOptions, LoadOptions, ResolverConfig,
};
use descriptor_git::NO_VERSION;
use descriptor_test_utils::{git, project::TestProject};
use pretty_assertions::assert_eq;

fn options() -> LoadOptions {
    LoadOptions {
        recipe: None,
        resolver: ResolverConfig::new("/tmp/recipes-cache"),
    }
}

fn open(project: &TestProject) -> Descriptor {
    Descriptor::load(project.root(), options()).unwrap()
}

#[test]
fn test_not_found_on_empty_directory() {
    let project = TestProject::empty();
    let err = Descriptor::load(project.root(), options()).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_each_generation_round_trips_type_declarations() {
    let fixtures = [
        (TestProject::legacy_v1("commons"), 1, "commons"),
        (TestProject::legacy("template-ros", "2"), 2, "template-ros"),
        (
            TestProject::legacy_v3("template-basic", &[]),
            3,
            "template-basic",
        ),
        (TestProject::layered("demo"), 4, "template-basic"),
    ];
    for (project, generation, ptype) in fixtures {
        let descriptor = open(&project);
        assert_eq!(descriptor.generation().number(), generation);
        assert_eq!(descriptor.project_type().unwrap(), ptype);
        assert_eq!(
            descriptor.type_version().unwrap(),
            generation.to_string()
        );
    }
}

#[test]
fn test_git_adapter_and_facts_from_real_repository() {
    let project = TestProject::layered("demo");
    let repo = git::init_repo(project.root());
    project.write("README.md", "# demo\n");
    git::commit_all(&repo, "initial");
    git::add_origin(&repo, "git@github.com:acme/demo-project.git");

    let descriptor = open(&project);
    assert_eq!(
        descriptor.adapters(),
        &[Adapter::Filesystem, Adapter::Git, Adapter::Descriptor]
    );

    let facts = descriptor.facts().unwrap();
    assert_eq!(facts.branch, "main");
    assert_eq!(facts.repository.as_deref(), Some("demo-project"));
    assert_eq!(
        facts.origin_https_url.as_deref(),
        Some("https://github.com/acme/demo-project")
    );
    assert_eq!(descriptor.version_name(), "main");
    assert!(descriptor.is_clean());
}

#[test]
fn test_facts_snapshot_is_never_refreshed() {
    let project = TestProject::layered("demo");
    let repo = git::init_repo(project.root());
    git::commit_all(&repo, "initial");

    let descriptor = open(&project);
    assert!(descriptor.is_clean());

    // dirty the tree after loading: the snapshot must not notice
    project.write("scratch.txt", "changed\n");
    assert!(descriptor.is_clean());

    // a new descriptor observes the change
    let reloaded = open(&project);
    assert!(reloaded.is_dirty());
}

#[test]
fn test_release_state_requires_clean_tree_and_head_tag() {
    let project = TestProject::layered("demo");
    let repo = git::init_repo(project.root());
    git::commit_all(&repo, "initial");

    let untagged = open(&project);
    assert!(!untagged.is_release());

    git::tag_head(&repo, "v1.2.3");
    let tagged = open(&project);
    assert!(tagged.is_release());
    assert_eq!(tagged.head_version(), "v1.2.3");

    project.write("scratch.txt", "dirty\n");
    let dirty = open(&project);
    assert!(!dirty.is_release());
    let err = dirty
        .image_release("amd64", "r", "o", &ImageOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotReleased));
}

#[test]
fn test_resolved_suffix_excluded_from_added_count() {
    let project = TestProject::layered("demo");
    let repo = git::init_repo(project.root());
    git::commit_all(&repo, "initial");

    project.write("conflict.resolved", "ours\n");
    let descriptor = open(&project);
    assert!(descriptor.is_clean());

    project.write("plain.txt", "new\n");
    let dirtied = open(&project);
    assert_eq!(dirtied.facts().unwrap().added_count, 1);
}

#[test]
fn test_release_image_uses_head_tag_not_branch() {
    let project = TestProject::layered("x");
    let repo = git::init_repo(project.root());
    git::commit_all(&repo, "initial");
    git::tag_head(&repo, "v2.0.0");

    let descriptor = open(&project);
    assert_eq!(
        descriptor
            .image_release("amd64", "r", "o", &ImageOptions::default())
            .unwrap(),
        "r/o/x:v2.0.0-amd64"
    );
    // the plain image keeps using the branch
    assert_eq!(
        descriptor
            .image("amd64", "r", "o", &ImageOptions::default())
            .unwrap(),
        "r/o/x:main-amd64"
    );
}

#[test]
fn test_branch_names_are_sanitized_in_tags() {
    let project = TestProject::layered("x");
    let repo = git::init_repo(project.root());
    git::commit_all(&repo, "initial");
    repo.branch(
        "feature/new-thing",
        &repo.head().unwrap().peel_to_commit().unwrap(),
        false,
    )
    .unwrap();
    repo.set_head("refs/heads/feature/new-thing").unwrap();

    let descriptor = open(&project);
    assert_eq!(descriptor.version_name(), "feature/new-thing");
    assert_eq!(descriptor.safe_version_name(), "feature-new-thing");
    assert_eq!(
        descriptor
            .image("amd64", "r", "o", &ImageOptions::default())
            .unwrap(),
        "r/o/x:feature-new-thing-amd64"
    );
}

#[test]
fn test_legacy_name_prefers_repository_over_basename() {
    let project = TestProject::legacy("template-basic", "2");
    let repo = git::init_repo(project.root());
    git::commit_all(&repo, "initial");
    git::add_origin(&repo, "https://github.com/acme/Named-From-Origin.git");

    let descriptor = open(&project);
    assert_eq!(descriptor.name(), "named-from-origin");
}

#[test]
fn test_layered_name_ignores_repository() {
    let project = TestProject::layered("declared");
    let repo = git::init_repo(project.root());
    git::commit_all(&repo, "initial");
    git::add_origin(&repo, "https://github.com/acme/other-name.git");

    let descriptor = open(&project);
    assert_eq!(descriptor.name(), "declared");
}

#[test]
fn test_legacy_distro_from_branch_prefix() {
    let project = TestProject::legacy("template-basic", "2");
    let repo = git::init_repo(project.root());
    git::commit_all(&repo, "initial");
    repo.branch(
        "stable-devel",
        &repo.head().unwrap().peel_to_commit().unwrap(),
        false,
    )
    .unwrap();
    repo.set_head("refs/heads/stable-devel").unwrap();

    let descriptor = open(&project);
    assert_eq!(descriptor.distro(), "stable");
}

#[test]
fn test_legacy_distro_on_detached_head_is_branch_sentinel() {
    let project = TestProject::legacy("template-basic", "2");
    let repo = git::init_repo(project.root());
    let oid = git::commit_all(&repo, "initial");
    repo.set_head_detached(oid).unwrap();

    let descriptor = open(&project);
    assert!(descriptor.is_detached());
    assert_eq!(descriptor.distro(), "HEAD");
}

#[test]
fn test_sha_sentinel_without_commits() {
    let project = TestProject::layered("demo");
    git::init_repo(project.root());

    let descriptor = open(&project);
    assert_eq!(descriptor.sha(), NO_VERSION);
    assert_eq!(descriptor.head_version(), NO_VERSION);
    assert_eq!(descriptor.version_name(), "main");
}

#[test]
fn test_extension_sections_preserved() {
    let project = TestProject::layered("demo");
    project.write_layer("telemetry", "endpoint: https://example.com\nenabled: true\n");

    let descriptor = open(&project);
    let layers = descriptor.layers().unwrap();
    let section = layers.extensions.get("telemetry").unwrap();
    assert_eq!(
        section["endpoint"],
        serde_yaml::to_value("https://example.com").unwrap()
    );
}

#[test]
fn test_malformed_and_unsupported_versions() {
    let project = TestProject::empty();
    project.write(".descriptor", "TYPE=template-basic\nTYPE_VERSION=*\nVERSION=1\n");
    let err = Descriptor::load(project.root(), options()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedVersion { .. }));

    let missing = TestProject::empty();
    missing.write(".descriptor", "TYPE_VERSION=2\nTYPE=template-basic\n");
    let err = Descriptor::load(missing.root(), options()).unwrap_err();
    match err {
        Error::Malformed { message } => assert!(message.contains("VERSION")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_required_layer_is_malformed() {
    let project = TestProject::layered("demo");
    project.remove_layer("base");
    let err = Descriptor::load(project.root(), options()).unwrap_err();
    match err {
        Error::Malformed { message } => assert!(message.contains("base.yaml")),
        other => panic!("unexpected error: {other}"),
    }
}
