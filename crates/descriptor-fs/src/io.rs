//! Text I/O with path-carrying error context

use crate::{Error, NormalizedPath, Result};
use std::fs;

/// Read a file into a string.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    fs::read_to_string(path.to_native()).map_err(|e| Error::io(path.to_native(), e))
}

/// Write a string to a file, creating parent directories as needed.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    let native = path.to_native();
    if let Some(parent) = native.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(&native, content).map_err(|e| Error::io(native, e))
}

/// Read a file as a list of trimmed lines.
pub fn read_lines(path: &NormalizedPath) -> Result<Vec<String>> {
    Ok(read_text(path)?
        .lines()
        .map(|line| line.trim().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = NormalizedPath::new(dir.path().join("nested/out.txt"));
        write_text(&path, "hello\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_read_missing_file_carries_path() {
        let err = read_text(&NormalizedPath::from("/definitely/not/here.txt")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn test_read_lines_trims() {
        let dir = TempDir::new().unwrap();
        let path = NormalizedPath::new(dir.path().join("deps.txt"));
        write_text(&path, "  one \ntwo\n\n# three\n").unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["one", "two", "", "# three"]);
    }
}
