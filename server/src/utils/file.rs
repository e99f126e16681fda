//! File utility functions

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Expand a path string to an absolute path.
///
/// Handles `~` / `~/path` (home directory), relative paths and bare names
/// (joined onto the current directory). Absolute paths pass through.
/// The result is not canonicalized.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Read and parse a JSON document
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a file, creating parent directories
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute_unchanged() {
        assert_eq!(expand_path("/srv/campus"), PathBuf::from("/srv/campus"));
        assert_eq!(expand_path("  /srv/campus  "), PathBuf::from("/srv/campus"));
    }

    #[test]
    fn test_expand_path_relative_becomes_absolute() {
        let result = expand_path("./rooms.json");
        assert!(result.is_absolute());
        assert!(result.ends_with("rooms.json"));

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path(".."), cwd.join(".."));
        assert!(expand_path("").is_absolute());
    }

    #[test]
    fn test_expand_path_tilde() {
        let result = expand_path("~/.campus-insider");
        assert!(!result.to_string_lossy().contains('~'));
        assert!(result.ends_with(".campus-insider"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
        }
    }

    #[tokio::test]
    async fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("clean.json");

        write_file(&path, r#"["Bailey Hall", "Luther Bonney Hall"]"#)
            .await
            .unwrap();
        let back: Vec<String> = read_json(&path).await.unwrap();
        assert_eq!(back, vec!["Bailey Hall", "Luther Bonney Hall"]);
    }

    #[tokio::test]
    async fn test_read_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = read_json::<serde_json::Value>(&path).await.unwrap_err();
        assert!(err.to_string().contains("broken.json"));

        let missing = read_json::<serde_json::Value>(&dir.path().join("missing.json")).await;
        assert!(missing.is_err());
    }
}
