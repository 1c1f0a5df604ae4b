//! [`TestProject`] builder for on-disk descriptor fixtures.
//!
//! Builds minimal valid projects for each of the four descriptor
//! generations inside a temporary directory.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A temporary project directory with helpers for descriptor fixtures.
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::empty()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn empty() -> Self {
        Self {
            temp_dir: TempDir::new().expect("TestProject: failed to create temp dir"),
        }
    }

    /// Root path of the project.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file relative to the project root, creating parents.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("TestProject: failed to create parent dirs");
        }
        fs::write(&path, content).expect("TestProject: failed to write file");
    }

    /// Create a directory relative to the project root.
    pub fn mkdir(&self, relative: &str) {
        fs::create_dir_all(self.root().join(relative))
            .expect("TestProject: failed to create directory");
    }

    /// Remove a file or directory relative to the project root.
    pub fn remove(&self, relative: &str) {
        let path = self.root().join(relative);
        if path.is_dir() {
            fs::remove_dir_all(&path).expect("TestProject: failed to remove dir");
        } else {
            fs::remove_file(&path).expect("TestProject: failed to remove file");
        }
    }

    /// Minimal generation-2 project: a `.descriptor` file only.
    pub fn legacy(ptype: &str, type_version: &str) -> Self {
        let project = Self::empty();
        project.write_legacy_metadata(ptype, type_version, &[]);
        project
    }

    /// Minimal generation-1 project: `.descriptor` plus the legacy
    /// `launch.sh` script and `code/` directory.
    pub fn legacy_v1(ptype: &str) -> Self {
        let project = Self::legacy(ptype, "1");
        project.write("launch.sh", "#!/bin/bash\necho launch\n");
        project.mkdir("code");
        project
    }

    /// Minimal generation-3 project: `.descriptor` plus the companion
    /// dependency file.
    pub fn legacy_v3(ptype: &str, extra_keys: &[(&str, &str)]) -> Self {
        let project = Self::empty();
        project.write_legacy_metadata(ptype, "3", extra_keys);
        project.write("dependencies-py3.extra.txt", "");
        project
    }

    /// Write a `.descriptor` metadata file with the given TYPE and
    /// TYPE_VERSION, a fixed VERSION, and any extra keys.
    pub fn write_legacy_metadata(&self, ptype: &str, type_version: &str, extra: &[(&str, &str)]) {
        let mut content = format!(
            "# project metadata\nTYPE={ptype}\nTYPE_VERSION={type_version}\nVERSION=0.1.0\n"
        );
        for (key, value) in extra {
            content.push_str(&format!("{key}={value}\n"));
        }
        self.write(".descriptor", &content);
    }

    /// Minimal generation-4 project: `descriptor/` with the four required
    /// layer files and a template layer.
    pub fn layered(name: &str) -> Self {
        let project = Self::empty();
        project.write_layer(
            "format",
            "version: 4\n",
        );
        project.write_layer(
            "self",
            &format!(
                "name: {name}\n\
                 maintainer:\n  name: Test User\n  email: test@test.com\n\
                 description: A test project\n\
                 version: 1.2.3\n\
                 icon: cube\n"
            ),
        );
        project.write_layer("distro", "name: stable\n");
        project.write_layer(
            "base",
            "repository: base-image\norganization: acme\ntag: stable\n",
        );
        project.write_layer("template", "name: template-basic\nversion: \"4\"\n");
        project
    }

    /// Write a named layer file under `descriptor/`.
    pub fn write_layer(&self, layer: &str, yaml: &str) {
        self.write(&format!("descriptor/{layer}.yaml"), yaml);
    }

    /// Remove a named layer file under `descriptor/`.
    pub fn remove_layer(&self, layer: &str) {
        self.remove(&format!("descriptor/{layer}.yaml"));
    }
}
