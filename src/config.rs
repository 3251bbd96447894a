use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_PATH_ENV: &str = "IMMO_CONFIG";
const DB_PATH_ENV: &str = "IMMO_DB_PATH";
const BIND_ADDR_ENV: &str = "IMMO_BIND_ADDR";

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub scraper: ScraperConfig,
    pub ingest: IngestConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            max_workers: 8,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "immo_scout.sqlite3".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root; search paths and expose hrefs are resolved against it.
    pub base_url: String,
    pub user_agent: String,
    /// Per request, applied by the HTTP client.
    pub timeout_secs: u64,
    /// Written into every address; the site only lists one country.
    pub country: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.immobilienscout24.de".to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: 10,
            country: "Germany".to_string(),
        }
    }
}

/// Defaults for an ingestion run when the caller leaves a location out.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct IngestConfig {
    pub state: String,
    pub city: String,
    pub district: String,
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            state: "Nordrhein-Westfalen".to_string(),
            city: "Muenster".to_string(),
            district: String::new(),
            batch_size: 25,
        }
    }
}

/// `.env`, then the TOML file from `path` or `IMMO_CONFIG` (if any), then
/// the `IMMO_DB_PATH` / `IMMO_BIND_ADDR` overrides.
pub fn read_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            parse_config(&text).map_err(|source| ConfigError::Parse { path, source })?
        }
        None => AppConfig::default(),
    };

    if let Ok(db_path) = std::env::var(DB_PATH_ENV) {
        config.store.db_path = db_path;
    }
    if let Ok(bind_addr) = std::env::var(BIND_ADDR_ENV) {
        config.server.bind_addr = bind_addr;
    }

    Ok(config)
}

pub fn parse_config(text: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(text)
}
