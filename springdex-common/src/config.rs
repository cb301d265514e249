//! Configuration loading and resolution
//!
//! Resolution priority for every setting:
//! 1. Environment variable (highest)
//! 2. TOML config file (`~/.config/springdex/config.toml`)
//! 3. Compiled default

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default HTTP fetch timeout, seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Service configuration resolved from env + TOML + defaults
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// HTTP listen port
    pub port: u16,
    /// Upstream source endpoints
    pub sources: SourceEndpoints,
}

/// Base URLs of the upstream sources the sync pipeline reads from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEndpoints {
    /// Dependency-metadata API (anchor project versions)
    pub metadata_url: String,
    /// Generations / release-train compatibility API
    pub generations_url: String,
    /// Per-project page base URL (`{base}/{slug}.json`)
    pub project_page_url: String,
    /// Navigation HTML page for relationship discovery
    pub navigation_url: String,
    /// Guide index (code examples)
    pub guides_url: String,
    /// Repository listing (code examples)
    pub repos_url: String,
    /// Documentation content base URL (`{base}/{slug}`)
    pub docs_url: String,
    /// Per-request fetch timeout, seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            metadata_url: "https://start.spring.io/metadata/client".to_string(),
            generations_url: "https://api.spring.io/generations".to_string(),
            project_page_url: "https://spring.io/projects".to_string(),
            navigation_url: "https://spring.io/projects".to_string(),
            guides_url: "https://spring.io/guides/index.json".to_string(),
            repos_url: "https://api.github.com/orgs/spring-guides/repos".to_string(),
            docs_url: "https://docs.spring.io".to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

/// On-disk TOML configuration file shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub sources: Option<SourceEndpoints>,
}

impl ServiceConfig {
    /// Resolve configuration from environment, TOML file, and defaults
    pub fn resolve() -> Self {
        let toml_config = match load_toml_config() {
            Ok(config) => {
                tracing::info!("Loaded TOML configuration");
                config
            }
            Err(Error::Config(reason)) => {
                tracing::debug!(reason = %reason, "No usable TOML config, using defaults");
                TomlConfig::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read TOML config, using defaults");
                TomlConfig::default()
            }
        };

        let database_path = std::env::var("SPRINGDEX_DATABASE")
            .map(PathBuf::from)
            .ok()
            .or_else(|| toml_config.database_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_database_path);

        let port = std::env::var("SPRINGDEX_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .or(toml_config.port)
            .unwrap_or(5760);

        let mut sources = toml_config.sources.unwrap_or_default();
        if let Ok(base) = std::env::var("SPRINGDEX_BASE_URL") {
            // Single override for air-gapped / test deployments: every
            // source is served from one host
            let base = base.trim_end_matches('/');
            sources.metadata_url = format!("{}/metadata/client", base);
            sources.generations_url = format!("{}/generations", base);
            sources.project_page_url = format!("{}/projects", base);
            sources.navigation_url = format!("{}/projects", base);
            sources.guides_url = format!("{}/guides/index.json", base);
            sources.repos_url = format!("{}/repos", base);
            sources.docs_url = format!("{}/docs", base);
        }

        Self {
            database_path,
            port,
            sources,
        }
    }
}

/// Load the TOML config file if one exists
fn load_toml_config() -> Result<TomlConfig> {
    let path = config_file_path()?;
    if !path.exists() {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Platform config file path (`~/.config/springdex/config.toml`)
fn config_file_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("springdex").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("springdex").join("springdex.db"))
        .unwrap_or_else(|| PathBuf::from("./springdex.db"))
}
