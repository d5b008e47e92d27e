use crate::domain::error::CacheError;
use crate::domain::model::CacheKind;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "insight-cache";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Overrides the default database location
    pub database_path: Option<String>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_question_ttl_days")]
    pub question_ttl_days: u32,
    #[serde(default = "default_search_ttl_days")]
    pub search_ttl_days: u32,
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            question_ttl_days: default_question_ttl_days(),
            search_ttl_days: default_search_ttl_days(),
            similar_limit: default_similar_limit(),
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: default_log_level(),
        }
    }
}

impl CacheConfig {
    pub fn ttl_for(&self, kind: CacheKind) -> Duration {
        let days = match kind {
            CacheKind::Question => self.question_ttl_days,
            CacheKind::Search => self.search_ttl_days,
        };
        Duration::days(i64::from(days))
    }
}

// Defaults
fn default_question_ttl_days() -> u32 {
    30
}
fn default_search_ttl_days() -> u32 {
    7
}
fn default_similar_limit() -> usize {
    3
}
fn default_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
}

/// Get database path (config override, else ~/.config/insight-cache/cache.db on Linux)
pub fn get_database_path(config: &Config) -> PathBuf {
    if let Some(path) = config.database_path.as_deref().filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("cache.db")
}

pub fn parse_config(content: &str) -> Result<Config, CacheError> {
    let config = toml::from_str::<Config>(content)?;
    if config.cache.similar_limit == 0 {
        return Err(CacheError::Config(
            "cache.similar_limit must be at least 1".to_string(),
        ));
    }
    Ok(config)
}

/// Load config from `path`, falling back to defaults when missing or invalid
pub fn load_config_from(path: &Path) -> Result<Config, CacheError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    match parse_config(&content) {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to parse config file: {}. Using defaults.",
                e
            );
            Ok(Config::default())
        }
    }
}

pub fn load_config() -> Result<Config, CacheError> {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

pub fn write_config_sample(path: &Path) -> Result<bool, CacheError> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let toml_content = toml::to_string_pretty(&Config::default())
        .map_err(|e| CacheError::Config(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, toml_content)
        .map_err(|e| CacheError::Config(format!("Failed to write config file: {}", e)))?;
    Ok(true)
}

pub fn generate_config_sample() -> Result<(), CacheError> {
    let Some(path) = get_config_path() else {
        return Err(CacheError::Config(
            "Cannot determine config directory".to_string(),
        ));
    };

    if write_config_sample(&path)? {
        println!("Generated config file at: {}", path.display());
    } else {
        eprintln!("Config file already exists at: {}", path.display());
    }
    Ok(())
}
