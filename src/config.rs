use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Server settings, loadable from a TOML file. Every field has a default so a
/// partial file is enough; command line flags override whatever was loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Path to the sqlite database file
    pub database: PathBuf,
    /// Directory scanned for course documents at startup
    pub coursebase: PathBuf,
    /// Language stamped into the metadata of imported courses
    pub language: String,
    /// Log directory, logs go to stderr only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: PathBuf::from("database/granulearn.db"),
            coursebase: PathBuf::from("coursebase"),
            language: "en".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
