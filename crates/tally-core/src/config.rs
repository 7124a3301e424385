//! Configuration loading
//!
//! Settings are layered: built-in defaults, then the embedded
//! `config/default.toml`, then a user file. The user file is either passed
//! explicitly or found at the platform config directory
//! (`~/.config/tally/config.toml` on Linux). Keys missing from a layer keep
//! the value from the layer below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::db::MEMORY_PATH;
use crate::error::{Error, Result};
use crate::models::DEFAULT_CATEGORY;

/// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Resolved application settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_dir: PathBuf,
    pub category_file: PathBuf,
    pub budget_file: Option<PathBuf>,
    /// SQLite file path, or `:memory:`
    pub db_path: String,
    /// One of `DEBUG`, `INFO`, `WARNING`, `ERROR`
    pub log_level: String,
    pub default_category: String,
    /// Expected source column layout (informational)
    pub transaction_columns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            category_file: PathBuf::from("data/category_list.csv"),
            budget_file: None,
            db_path: MEMORY_PATH.to_string(),
            log_level: "INFO".to_string(),
            default_category: DEFAULT_CATEGORY.to_string(),
            transaction_columns: ["date", "amount", "nr_1", "nr_2", "description"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Platform location of the user override file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tally").join("config.toml"))
}

/// Map a configured level name to a `tracing` filter directive
pub fn log_filter(level: &str) -> Option<&'static str> {
    match level.trim().to_uppercase().as_str() {
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARNING" | "WARN" => Some("warn"),
        "ERROR" => Some("error"),
        _ => None,
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the default override
    /// location is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::parse(DEFAULT_CONFIG)?;

        let user_file = match path {
            Some(p) if !p.exists() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(file) = user_file {
            info!("Loading config from: {}", file.display());
            let content = fs::read_to_string(&file)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
            config.apply(&content)?;
        } else {
            debug!("No config override found, using defaults");
        }

        Ok(config)
    }

    /// Parse a TOML document over the built-in defaults
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply(content)?;
        Ok(config)
    }

    /// Overlay the keys present in `content`
    fn apply(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(paths) = raw.paths {
            if let Some(dir) = paths.input_dir {
                self.input_dir = dir;
            }
            if let Some(file) = paths.category_file {
                self.category_file = file;
            }
            if let Some(file) = paths.budget_file {
                self.budget_file = Some(file);
            }
        }

        if let Some(path) = raw.database.and_then(|d| d.path) {
            self.db_path = path;
        }

        if let Some(level) = raw.logging.and_then(|l| l.level) {
            if log_filter(&level).is_none() {
                return Err(Error::Config(format!("Unknown log level: {}", level)));
            }
            self.log_level = level;
        }

        if let Some(category) = raw.categorization.and_then(|c| c.default_category) {
            self.default_category = category;
        }

        if let Some(columns) = raw.import.and_then(|i| i.transaction_columns) {
            self.transaction_columns = columns;
        }

        Ok(())
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    paths: Option<RawPaths>,
    database: Option<RawDatabase>,
    logging: Option<RawLogging>,
    categorization: Option<RawCategorization>,
    import: Option<RawImport>,
}

#[derive(Debug, Deserialize)]
struct RawPaths {
    input_dir: Option<PathBuf>,
    category_file: Option<PathBuf>,
    budget_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLogging {
    level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCategorization {
    default_category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawImport {
    transaction_columns: Option<Vec<String>>,
}
