//! Recipe selection, cache layout, and update-check behavior.
//!
//! Clones use local path remotes so the tests stay hermetic; the
//! update-check flow is exercised through the on-disk stamp file.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use descriptor_core::recipe::{UPDATE_CHECK_FILE, UPDATE_CHECK_WINDOW, UpdateStamp};
use descriptor_core::{Descriptor, Error, LoadOptions, ResolverConfig};
use descriptor_test_utils::{git, project::TestProject};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn exercise_project(location: &str) -> TestProject {
    TestProject::legacy_v3(
        "template-exercise",
        &[
            ("NAME", "ex1"),
            ("RECIPE_REPOSITORY", "recipes"),
            ("RECIPE_BRANCH", "main"),
            ("RECIPE_LOCATION", location),
        ],
    )
}

fn layered_with_recipes(name: &str, recipes_yaml: &str) -> TestProject {
    let project = TestProject::layered(name);
    project.write_layer("options", "needs_recipe: true\n");
    project.write_layer("recipes", recipes_yaml);
    project
}

fn open_with_cache(project: &TestProject, cache: &TempDir) -> Descriptor {
    Descriptor::load(
        project.root(),
        LoadOptions {
            recipe: None,
            resolver: ResolverConfig::new(cache.path()),
        },
    )
    .unwrap()
}

#[test]
fn test_default_recipe_resolves_without_selector() {
    let cache = TempDir::new().unwrap();
    let project = layered_with_recipes(
        "demo",
        "default:\n  repository: recipes\n  branch: main\n  location: demo\n",
    );
    let descriptor = open_with_cache(&project, &cache);

    let recipe = descriptor.recipe_info().unwrap();
    assert_eq!(recipe.repository, "recipes");
    assert_eq!(
        descriptor.recipe_dir().unwrap(),
        cache.path().join("recipes/main/demo")
    );
}

#[test]
fn test_explicit_selector_resolves_named_recipe() {
    let cache = TempDir::new().unwrap();
    let project = layered_with_recipes(
        "demo",
        "default:\n  repository: recipes\n  branch: main\n\
         alt:\n  repository: other-recipes\n  branch: devel\n",
    );
    let descriptor = Descriptor::load(
        project.root(),
        LoadOptions {
            recipe: Some("alt".to_string()),
            resolver: ResolverConfig::new(cache.path()),
        },
    )
    .unwrap();

    let recipe = descriptor.recipe_info().unwrap();
    assert_eq!(recipe.repository, "other-recipes");
    assert_eq!(recipe.branch, "devel");
}

#[test]
fn test_unknown_selector_rejected_with_available_names() {
    let cache = TempDir::new().unwrap();
    let project = layered_with_recipes(
        "demo",
        "default:\n  repository: recipes\n  branch: main\n",
    );
    let err = Descriptor::load(
        project.root(),
        LoadOptions {
            recipe: Some("missing".to_string()),
            resolver: ResolverConfig::new(cache.path()),
        },
    )
    .unwrap_err();
    match err {
        Error::UnknownRecipe { name, available } => {
            assert_eq!(name, "missing");
            assert_eq!(available, vec!["default".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_legacy_exercise_cache_path() {
    let cache = TempDir::new().unwrap();
    let project = exercise_project("exercises/ex1");
    let descriptor = open_with_cache(&project, &cache);

    assert!(descriptor.needs_recipe());
    assert_eq!(
        descriptor.recipe_dir().unwrap(),
        cache.path().join("recipes/main/exercises/ex1")
    );
}

#[test]
fn test_ensure_recipe_noop_when_already_present() {
    let cache = TempDir::new().unwrap();
    let project = exercise_project("ex1");
    let descriptor = open_with_cache(&project, &cache);

    std::fs::create_dir_all(descriptor.recipe_dir().unwrap()).unwrap();
    descriptor.ensure_recipe_exists().unwrap();
}

#[test]
fn test_recipe_loaded_as_descriptor() {
    let cache = TempDir::new().unwrap();
    let project = exercise_project("ex1");
    let descriptor = open_with_cache(&project, &cache);

    // materialize the cached recipe project by hand
    let recipe_dir = descriptor.recipe_dir().unwrap();
    let recipe_fixture = TestProject::layered("ex1-recipe");
    copy_tree(recipe_fixture.root(), &recipe_dir);

    let recipe = descriptor.recipe().unwrap();
    assert_eq!(recipe.name(), "ex1-recipe");
    assert_eq!(recipe.generation().number(), 4);
}

#[test]
fn test_dockerfile_delegates_to_recipe() {
    let cache = TempDir::new().unwrap();
    let project = exercise_project("ex1");
    let descriptor = open_with_cache(&project, &cache);

    let recipe_dir = descriptor.recipe_dir().unwrap();
    std::fs::create_dir_all(&recipe_dir).unwrap();
    std::fs::write(recipe_dir.join("Dockerfile"), "FROM scratch\n").unwrap();

    assert_eq!(
        descriptor.dockerfile().unwrap(),
        recipe_dir.join("Dockerfile")
    );
}

#[test]
fn test_launchers_merge_recipe_launchers() {
    let cache = TempDir::new().unwrap();
    let project = exercise_project("ex1");
    project.write("launchers/local.sh", "#!/bin/bash\necho local\n");

    let descriptor = open_with_cache(&project, &cache);
    let recipe_dir = descriptor.recipe_dir().unwrap();
    std::fs::create_dir_all(recipe_dir.join("launchers")).unwrap();
    std::fs::write(
        recipe_dir.join("launchers/remote.sh"),
        "#!/bin/bash\necho remote\n",
    )
    .unwrap();

    assert_eq!(
        descriptor.launchers().unwrap(),
        vec!["local".to_string(), "remote".to_string()]
    );
}

#[test]
fn test_update_skipped_for_custom_recipe_dir() {
    let cache = TempDir::new().unwrap();
    let custom = TempDir::new().unwrap();
    let project = exercise_project("ex1");
    let mut descriptor = open_with_cache(&project, &cache);

    descriptor.set_recipe_dir(custom.path());
    assert_eq!(descriptor.recipe_dir().unwrap(), custom.path());
    assert!(!descriptor.update_recipe().unwrap());
}

#[test]
fn test_update_errors_when_recipe_never_cloned() {
    let cache = TempDir::new().unwrap();
    let project = exercise_project("ex1");
    let descriptor = open_with_cache(&project, &cache);

    let err = descriptor.update_recipe().unwrap_err();
    assert!(matches!(err, Error::RecipeNotFound { .. }));
}

#[test]
fn test_fresh_stamp_reports_up_to_date_without_network() {
    let cache = TempDir::new().unwrap();
    let project = exercise_project("ex1");
    let descriptor = open_with_cache(&project, &cache);

    let recipe_dir = descriptor.recipe_dir().unwrap();
    std::fs::create_dir_all(&recipe_dir).unwrap();
    // the clone lives at the checkout root; `ex1` is a subdirectory of it
    let repo = git::init_repo(recipe_dir.parent().unwrap());
    git::commit_file(&repo, "Dockerfile", "FROM scratch\n", "initial");

    // first call writes the stamp from the local SHA, no remote involved
    assert!(!descriptor.update_recipe().unwrap());
    let stamp_path = recipe_dir.join(UPDATE_CHECK_FILE);
    let stamp: UpdateStamp =
        serde_json::from_str(&std::fs::read_to_string(&stamp_path).unwrap()).unwrap();
    assert!(!stamp.remote.is_empty());

    // second call inside the window is a cache hit, still no remote
    assert!(!descriptor.update_recipe().unwrap());
}

#[test]
fn test_stale_stamp_triggers_exactly_one_remote_consultation() {
    let cache = TempDir::new().unwrap();
    // a provider without an update API turns the remote consultation
    // into an observable hard error
    let project = TestProject::layered("demo");
    project.write_layer("options", "needs_recipe: true\n");
    project.write_layer(
        "recipes",
        "default:\n  repository: recipes\n  branch: main\n  provider: gitlab.example.com\n",
    );
    let descriptor = open_with_cache(&project, &cache);

    let recipe_dir = descriptor.recipe_dir().unwrap();
    std::fs::create_dir_all(&recipe_dir).unwrap();
    let repo = git::init_repo(&recipe_dir);
    git::commit_file(&repo, "Dockerfile", "FROM scratch\n", "initial");

    // fresh stamp: inside the window the provider is never consulted
    assert!(!descriptor.update_recipe().unwrap());

    // age the stamp past the window: the very next call consults the remote
    let stamp_path = recipe_dir.join(UPDATE_CHECK_FILE);
    let old = SystemTime::now() - (UPDATE_CHECK_WINDOW + Duration::from_secs(60));
    std::fs::File::options()
        .write(true)
        .open(&stamp_path)
        .unwrap()
        .set_modified(old)
        .unwrap();

    let err = descriptor.update_recipe().unwrap_err();
    assert!(matches!(err, Error::UnsupportedProvider { .. }));
}

#[test]
fn test_recipes_root_from_environment_layout() {
    let config = ResolverConfig::new("/var/cache/descriptor/recipes");
    let recipe = descriptor_core::Recipe {
        repository: "recipes".to_string(),
        branch: "stable".to_string(),
        provider: "github.com".to_string(),
        organization: "acme".to_string(),
        location: Some("exercises/demo".to_string()),
    };
    assert_eq!(
        config.recipe_project_dir(&recipe),
        PathBuf::from("/var/cache/descriptor/recipes/recipes/stable/exercises/demo")
    );
}

/// Recursively copy a fixture tree into place.
fn copy_tree(from: &std::path::Path, to: &std::path::Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), &target).unwrap();
        }
    }
}
