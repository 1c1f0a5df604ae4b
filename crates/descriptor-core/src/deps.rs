//! Dependency list readers.
//!
//! Dependencies live in plain text files at the project root, one entry
//! per line. Blank lines are skipped; `#` comments are skipped unless
//! explicitly requested.

use std::path::Path;

use descriptor_fs::NormalizedPath;

use crate::Result;

/// System (apt) dependency list.
pub const APT_DEPS_FILE: &str = "dependencies-apt.txt";
/// Python dependency list.
pub const PY3_DEPS_FILE: &str = "dependencies-py3.txt";
/// Extra Python dependencies layered on top of the template's own.
pub const PY3_EXTRA_DEPS_FILE: &str = "dependencies-py3.extra.txt";

/// Read a dependency file as a list of entries.
///
/// Missing files yield an empty list. With `comments` set, comment lines
/// are kept verbatim.
pub fn load_dependencies_file(path: &Path, comments: bool) -> Result<Vec<String>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let lines = descriptor_fs::io::read_lines(&NormalizedPath::new(path))?;
    Ok(lines
        .into_iter()
        .filter(|line| !line.is_empty() && (comments || !line.starts_with('#')))
        .collect())
}

/// System dependencies declared by the project.
pub fn apt_dependencies(project_root: &Path) -> Result<Vec<String>> {
    load_dependencies_file(&project_root.join(APT_DEPS_FILE), false)
}

/// Python dependencies declared by the project.
pub fn py3_dependencies(project_root: &Path) -> Result<Vec<String>> {
    load_dependencies_file(&project_root.join(PY3_DEPS_FILE), false)
}

/// Extra Python dependencies declared by the project.
pub fn py3_extra_dependencies(project_root: &Path) -> Result<Vec<String>> {
    load_dependencies_file(&project_root.join(PY3_EXTRA_DEPS_FILE), false)
}
