use pagecraft_workspace::{AutoSaveConfig, HistoryConfig, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Pagecraft configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one `<page-id>.json` per page
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    #[serde(default)]
    pub autosave: AutoSaveConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    #[serde(default = "default_true")]
    pub pretty: bool,

    #[serde(default)]
    pub include_hidden: bool,

    #[serde(default = "default_out_dir")]
    pub out_dir: String,
}

fn default_true() -> bool {
    true
}

fn default_out_dir() -> String {
    "dist".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            include_hidden: false,
            out_dir: default_out_dir(),
        }
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> Result<Self, ConfigError> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);
        Self::load_from(&config_path)
    }

    /// Load a specific file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get absolute path to the pages directory
    pub fn get_pages_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.pages_dir)
    }

    pub fn get_out_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.export.out_dir)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            autosave: self.autosave.clone(),
            history: self.history.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            autosave: AutoSaveConfig::default(),
            history: HistoryConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "pagesDir": "content/pages",
            "autosave": { "delayMs": 1500 },
            "history": { "maxLevels": 20 },
            "export": { "includeHidden": true, "outDir": "public" }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.pages_dir, "content/pages");
        assert_eq!(config.autosave.delay_ms, 1500);
        assert_eq!(config.autosave.failure_threshold, 2);
        assert_eq!(config.history.max_levels, 20);
        assert!(config.export.pretty);
        assert!(config.export.include_hidden);
        assert_eq!(config.export.out_dir, "public");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pages_dir, "pages");
        assert_eq!(config.autosave.delay_ms, 3000);
        assert_eq!(config.history.max_levels, 100);
        assert_eq!(config.export.out_dir, "dist");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ not json").unwrap();

        let err = Config::load(&dir.path().display().to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
