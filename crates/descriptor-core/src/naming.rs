//! Container architecture identifiers and tag sanitizing

use regex::Regex;
use std::sync::OnceLock;

use crate::{Error, Result};

/// The three canonical container architecture identifiers.
pub const CANONICAL_ARCHITECTURES: [&str; 3] = ["amd64", "arm32v7", "arm64v8"];

/// Validate that `arch` is one of the canonical identifiers.
pub fn assert_canonical_arch(arch: &str) -> Result<()> {
    if CANONICAL_ARCHITECTURES.contains(&arch) {
        Ok(())
    } else {
        Err(Error::InvalidArchitecture {
            arch: arch.to_string(),
            valid: CANONICAL_ARCHITECTURES.join(", "),
        })
    }
}

/// Map a platform alias to its canonical architecture identifier.
pub fn canonical_arch(arch: &str) -> Result<&'static str> {
    match arch {
        "arm" | "arm32v7" | "armv7l" | "armhf" => Ok("arm32v7"),
        "x64" | "x86_64" | "amd64" => Ok("amd64"),
        "arm64" | "arm64v8" | "armv8" | "aarch64" => Ok("arm64v8"),
        _ => Err(Error::InvalidArchitecture {
            arch: arch.to_string(),
            valid: CANONICAL_ARCHITECTURES.join(", "),
        }),
    }
}

fn unsafe_tag_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\-.]").expect("valid tag pattern"))
}

/// Replace every character outside `[\w\-.]` with a dash.
pub fn sanitize_version(version: &str) -> String {
    unsafe_tag_chars().replace_all(version, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("amd64")]
    #[case("arm32v7")]
    #[case("arm64v8")]
    fn test_canonical_arch_accepted(#[case] arch: &str) {
        assert!(assert_canonical_arch(arch).is_ok());
    }

    #[rstest]
    #[case("x86")]
    #[case("AMD64")]
    #[case("riscv64")]
    #[case("")]
    fn test_arch_rejected(#[case] arch: &str) {
        let err = assert_canonical_arch(arch).unwrap_err();
        assert!(err.to_string().contains("amd64"));
    }

    #[test]
    fn test_alias_resolution() {
        assert_eq!(canonical_arch("x86_64").unwrap(), "amd64");
        assert_eq!(canonical_arch("aarch64").unwrap(), "arm64v8");
        assert_eq!(canonical_arch("armhf").unwrap(), "arm32v7");
        assert!(canonical_arch("mips").is_err());
    }

    #[test]
    fn test_sanitize_version() {
        assert_eq!(sanitize_version("feature/new-thing"), "feature-new-thing");
        assert_eq!(sanitize_version("v1.2.3"), "v1.2.3");
        assert_eq!(sanitize_version("a b:c"), "a-b-c");
    }
}
