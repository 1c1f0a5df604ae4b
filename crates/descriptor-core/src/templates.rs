//! Static template resolution tables.
//!
//! Each table maps a (project-type, type-version) pair to a rule deriving
//! a (source-relative, destination-absolute) path pair from the project's
//! resolved name. The tables are consulted by the descriptor, never
//! mutated.

/// Marker suffix denoting a directory glob in a source path.
pub const WILDCARD: &str = "*";

/// A resolved path-mapping rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    /// Path relative to the project root. May end in [`WILDCARD`].
    pub source: String,
    /// Absolute destination path (container-side).
    pub destination: String,
}

impl PathTemplate {
    fn new(source: &str, destination: String) -> Self {
        Self {
            source: source.to_string(),
            destination,
        }
    }

    /// Whether the source denotes a directory glob.
    pub fn is_glob(&self) -> bool {
        self.source.ends_with(WILDCARD)
    }
}

/// Source-code mount mapping for (type, version), given the project name.
pub fn source_mapping(ptype: &str, version: &str, name: &str) -> Option<PathTemplate> {
    let template = match (ptype, version) {
        ("commons", "1") | ("template-basic", "1") => {
            PathTemplate::new("code", format!("/packages/{name}/"))
        }
        ("commons", "2" | "3") | ("template-basic", "2" | "3" | "4") => {
            PathTemplate::new("", format!("/code/{name}/"))
        }
        ("ros-commons", "1" | "2" | "3")
        | ("template-ros", "1" | "2" | "3")
        | ("template-core", "1" | "2" | "3") => {
            PathTemplate::new("", format!("/code/catkin_ws/src/{name}/"))
        }
        ("template-exercise-recipe", "3") => {
            PathTemplate::new("packages", format!("/code/catkin_ws/src/{name}/packages"))
        }
        ("template-exercise", "3") => {
            PathTemplate::new("packages/*", format!("/code/catkin_ws/src/{name}/packages"))
        }
        _ => return None,
    };
    Some(template)
}

/// Launcher-directory mapping for (type, version), given the project name.
pub fn launcher_mapping(ptype: &str, version: &str, name: &str) -> Option<PathTemplate> {
    let launcher_types = [
        "commons",
        "ros-commons",
        "template-basic",
        "template-ros",
        "template-core",
    ];
    let template = match (ptype, version) {
        (t, "1") if launcher_types.contains(&t) => {
            PathTemplate::new("launch.sh", format!("/launch/{name}/launch.sh"))
        }
        (t, "2" | "3") if launcher_types.contains(&t) => {
            PathTemplate::new("launchers", format!("/launch/{name}"))
        }
        ("template-basic", "4") => PathTemplate::new("launchers", format!("/launch/{name}")),
        ("template-exercise" | "template-exercise-recipe", "3") => {
            PathTemplate::new("launchers", format!("/launch/{name}"))
        }
        _ => return None,
    };
    Some(template)
}

/// Assets mapping for (type, version), given the project name.
pub fn assets_mapping(ptype: &str, version: &str, name: &str) -> Option<PathTemplate> {
    match (ptype, version) {
        ("template-exercise" | "template-exercise-recipe", "3") => Some(PathTemplate::new(
            "assets/*",
            format!("/code/catkin_ws/src/{name}/assets"),
        )),
        _ => None,
    }
}

/// Documentation directory (relative to the project root) for (type, version).
pub fn docs_mapping(ptype: &str, version: &str) -> Option<&'static str> {
    match (ptype, version) {
        ("commons" | "ros-commons" | "template-basic" | "template-ros", "4") => Some("docs"),
        ("template-library", "2") => Some("docs"),
        ("template-book", "2") => Some(""),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("template-basic", "1", "code", "/packages/demo/")]
    #[case("template-basic", "4", "", "/code/demo/")]
    #[case("template-ros", "2", "", "/code/catkin_ws/src/demo/")]
    #[case("template-exercise", "3", "packages/*", "/code/catkin_ws/src/demo/packages")]
    fn test_source_mapping(
        #[case] ptype: &str,
        #[case] version: &str,
        #[case] source: &str,
        #[case] destination: &str,
    ) {
        let template = source_mapping(ptype, version, "demo").unwrap();
        assert_eq!(template.source, source);
        assert_eq!(template.destination, destination);
    }

    #[test]
    fn test_source_mapping_miss() {
        assert_eq!(source_mapping("template-basic", "9", "demo"), None);
        assert_eq!(source_mapping("unknown-type", "1", "demo"), None);
    }

    #[test]
    fn test_launcher_mapping_v1_is_single_script() {
        let template = launcher_mapping("commons", "1", "demo").unwrap();
        assert_eq!(template.source, "launch.sh");
        assert_eq!(template.destination, "/launch/demo/launch.sh");
        assert!(!template.is_glob());
    }

    #[test]
    fn test_assets_mapping_is_glob() {
        let template = assets_mapping("template-exercise", "3", "demo").unwrap();
        assert!(template.is_glob());
    }

    #[test]
    fn test_docs_mapping() {
        assert_eq!(docs_mapping("template-basic", "4"), Some("docs"));
        assert_eq!(docs_mapping("template-book", "2"), Some(""));
        assert_eq!(docs_mapping("template-basic", "1"), None);
    }
}
