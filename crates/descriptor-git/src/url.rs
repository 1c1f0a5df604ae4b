//! Remote URL normalization helpers

use regex::Regex;
use std::sync::OnceLock;

fn ssh_remote_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)git@([^:]+):([^/]+)/(.+)").expect("valid ssh remote pattern")
    })
}

/// Strip a trailing `.git` suffix and trailing slash from a remote URL.
pub fn normalize_remote_url(url: &str) -> &str {
    let url = url.strip_suffix('/').unwrap_or(url);
    url.strip_suffix(".git").unwrap_or(url)
}

/// Convert an ssh-style remote (`git@host:org/repo`) to its HTTPS form.
///
/// URLs that are already HTTPS (or anything else) pass through unchanged.
pub fn remote_url_to_https(url: &str) -> String {
    match ssh_remote_pattern().captures(url) {
        Some(caps) => format!("https://{}/{}/{}", &caps[1], &caps[2], &caps[3]),
        None => url.to_string(),
    }
}

/// The repository name encoded in a remote URL (its final path segment).
pub fn repository_name(url: &str) -> Option<&str> {
    normalize_remote_url(url)
        .rsplit('/')
        .next()
        .map(|name| name.rsplit(':').next().unwrap_or(name))
        .filter(|name| !name.is_empty())
}
