//! Application configuration.
//!
//! A `.env` file, when present, seeds the process environment first without
//! replacing variables that are already set.
//!
//! Values come from an optional TOML file (`cosmic.toml` in the working
//! directory, or the path in `COSMIC_CONFIG`) and are then overridden by
//! environment variables:
//!
//! - `HOST`, `PORT`: listen address (default `0.0.0.0:5000`)
//! - `NASA_API_KEY`: key for the NeoWs and InSight feeds
//! - `FRONTEND_URL`: comma-separated CORS origin allow-list, `*` for any
//! - `REPOSITORY_TYPE` (`local` | `postgres`), `DATABASE_URL`
//! - `PERSISTENCE_MODE` (`blocking` | `write-behind`)
//! - `EXOPLANET_ARCHIVE_URL`, `NASA_API_BASE_URL`: upstream overrides
//! - `RATE_LIMIT_MAX`, `RATE_LIMIT_WINDOW_SECS`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{EXOPLANET_TTL, INSIGHT_TTL, NEO_TTL};
use crate::db::RepositoryConfig;
use crate::services::PersistenceMode;
use crate::sources::exoplanet_archive::DEFAULT_ARCHIVE_URL;
use crate::sources::UPSTREAM_TIMEOUT;

pub const DEFAULT_CONFIG_FILE: &str = "cosmic.toml";
pub const CONFIG_PATH_VAR: &str = "COSMIC_CONFIG";
pub const DEFAULT_NASA_API_URL: &str = "https://api.nasa.gov";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Failed to load env file: {source}")]
    EnvFile {
        #[source]
        source: dotenvy::Error,
    },
}

/// Loads `KEY=value` lines from `path` into the process environment, or from
/// the nearest `.env` in the working directory or its parents when `path` is
/// `None`. Variables already set win. Returns the file that was loaded, or
/// `None` when there is no such file.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(source) => Err(ConfigError::EnvFile { source }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. `*` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec![DEFAULT_FRONTEND_URL.to_string()],
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NasaSettings {
    /// Required by the NEO and Mars weather endpoints.
    pub api_key: String,
    pub api_base_url: String,
    pub exoplanet_archive_url: String,
    pub timeout_secs: u64,
}

impl Default for NasaSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: DEFAULT_NASA_API_URL.to_string(),
            exoplanet_archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            timeout_secs: UPSTREAM_TIMEOUT.as_secs(),
        }
    }
}

impl NasaSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Cache lifetimes in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub exoplanet_ttl_secs: u64,
    pub neo_ttl_secs: u64,
    pub insight_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            exoplanet_ttl_secs: EXOPLANET_TTL.as_secs(),
            neo_ttl_secs: NEO_TTL.as_secs(),
            insight_ttl_secs: INSIGHT_TTL.as_secs(),
        }
    }
}

impl CacheSettings {
    pub fn exoplanet_ttl(&self) -> Duration {
        Duration::from_secs(self.exoplanet_ttl_secs)
    }

    pub fn neo_ttl(&self) -> Duration {
        Duration::from_secs(self.neo_ttl_secs)
    }

    pub fn insight_ttl(&self) -> Duration {
        Duration::from_secs(self.insight_ttl_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    pub mode: PersistenceMode,
}

/// Per-client-IP request budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 15 * 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub nasa: NasaSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub persistence: PersistenceSettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// `[repository]` and `[postgres]` sections.
    #[serde(flatten)]
    pub storage: RepositoryConfig,
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the config file (if any) and applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut config = match path {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PORT") {
            self.server.port = parse_var("PORT", port)?;
        }
        if let Some(origins) = var("FRONTEND_URL") {
            self.server.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(key) = var("NASA_API_KEY") {
            self.nasa.api_key = key;
        }
        if let Some(url) = var("NASA_API_BASE_URL") {
            self.nasa.api_base_url = url;
        }
        if let Some(url) = var("EXOPLANET_ARCHIVE_URL") {
            self.nasa.exoplanet_archive_url = url;
        }
        if let Some(mode) = var("PERSISTENCE_MODE") {
            self.persistence.mode = parse_var("PERSISTENCE_MODE", mode)?;
        }
        if let Some(max) = var("RATE_LIMIT_MAX") {
            self.rate_limit.max_requests = parse_var("RATE_LIMIT_MAX", max)?;
        }
        if let Some(window) = var("RATE_LIMIT_WINDOW_SECS") {
            self.rate_limit.window_secs = parse_var("RATE_LIMIT_WINDOW_SECS", window)?;
        }
        if let Some(repo_type) = var("REPOSITORY_TYPE") {
            self.storage.repository.repo_type = repo_type;
        }
        if let Some(url) = var("DATABASE_URL") {
            self.storage.postgres.database_url = url;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.nasa.timeout(), Duration::from_secs(10));
        assert_eq!(config.cache.neo_ttl(), Duration::from_secs(3600));
        assert_eq!(config.cache.exoplanet_ttl(), Duration::from_secs(86400));
        assert_eq!(config.persistence.mode, PersistenceMode::Blocking);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window_secs, 900);
        assert_eq!(config.storage.repository.repo_type, "local");
    }

    #[test]
    fn test_parse_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080
allowed_origins = ["https://dashboard.example.org"]

[nasa]
api_key = "from-file"

[cache]
neo_ttl_secs = 60

[persistence]
mode = "write-behind"

[rate_limit]
enabled = false

[repository]
type = "postgres"

[postgres]
database_url = "postgres://localhost/cosmic"
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.nasa.api_key, "from-file");
        assert_eq!(config.nasa.api_base_url, DEFAULT_NASA_API_URL);
        assert_eq!(config.cache.neo_ttl_secs, 60);
        assert_eq!(config.cache.insight_ttl_secs, 86400);
        assert_eq!(config.persistence.mode, PersistenceMode::WriteBehind);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.storage.repository.repo_type, "postgres");
        assert_eq!(
            config.storage.postgres.database_url,
            "postgres://localhost/cosmic"
        );
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"not a number\"").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_environment_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[
                ("PORT", "7000"),
                ("NASA_API_KEY", "DEMO_KEY"),
                ("FRONTEND_URL", "https://a.example, https://b.example/"),
                ("PERSISTENCE_MODE", "write-behind"),
                ("RATE_LIMIT_MAX", "5"),
                ("REPOSITORY_TYPE", "postgres"),
                ("DATABASE_URL", "postgres://db/cosmic"),
                ("HOST", ""),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.nasa.api_key, "DEMO_KEY");
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.persistence.mode, PersistenceMode::WriteBehind);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.storage.repository.repo_type, "postgres");
        assert_eq!(config.storage.postgres.database_url, "postgres://db/cosmic");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup(&[("PORT", "eighty")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT: \"eighty\"");
    }
}
