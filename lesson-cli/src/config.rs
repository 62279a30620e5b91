//! User configuration read from ~/.lesson/config.ron

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where pages named on the command line are kept
    pub pages_dir: Option<PathBuf>,
    pub log_level: String,
    /// Write the page right after a block is deleted
    pub flush_on_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_dir: None,
            log_level: "info".to_string(),
            flush_on_delete: true,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn pages_dir(&self, lesson_dir: &Path) -> PathBuf {
        self.pages_dir
            .clone()
            .unwrap_or_else(|| lesson_dir.join("pages"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.ron")).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(config.flush_on_delete);
        assert_eq!(config.pages_dir(dir.path()), dir.path().join("pages"));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        fs::write(&path, "(flush_on_delete: false, pages_dir: Some(\"/tmp/lessons\"))").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.flush_on_delete);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.pages_dir(dir.path()), PathBuf::from("/tmp/lessons"));
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        fs::write(&path, "(flush_on_delete: maybe)").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
