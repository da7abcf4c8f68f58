use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8081
}

/// Database configuration.
///
/// Pool bounds only shape how many connections exist; they never change
/// what an operation does.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Maximum number of open connections in the pool.
    #[serde(default = "default_max_open")]
    pub max_open: u32,
    /// Idle connections opened at startup and kept warm. Idle connections
    /// above this count are closed after a minute.
    #[serde(default = "default_max_idle")]
    pub max_idle: u32,
    /// Connections older than this are closed and replaced.
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
    /// How long a checkout waits for a free connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_open: default_max_open(),
            max_idle: default_max_idle(),
            max_lifetime_secs: default_max_lifetime_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("coursedex.db")
}

fn default_max_open() -> u32 {
    10
}

fn default_max_idle() -> u32 {
    10
}

fn default_max_lifetime_secs() -> u64 {
    180
}

fn default_connect_timeout_secs() -> u64 {
    30
}

/// External course catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Catalog API base URL (e.g., "https://api.coursera.org")
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_catalog_url() -> String {
    "https://api.coursera.org".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("coursedex/{}", env!("CARGO_PKG_VERSION"))
}

/// Ingestion configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Maximum number of courses persisted concurrently per request.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_max_concurrency() -> usize {
    10
}
