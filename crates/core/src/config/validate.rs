use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Pool has at least one connection and idle does not exceed open
/// - Pool connect timeout is not 0
/// - Catalog base URL is http(s)
/// - Ingest concurrency is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.database.max_open == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_open must be at least 1".to_string(),
        ));
    }

    if config.database.max_idle > config.database.max_open {
        return Err(ConfigError::ValidationError(format!(
            "database.max_idle ({}) cannot exceed database.max_open ({})",
            config.database.max_idle, config.database.max_open
        )));
    }

    if config.database.connect_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "database.connect_timeout_secs cannot be 0".to_string(),
        ));
    }

    let base_url = &config.catalog.base_url;
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "catalog.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    if config.ingest.max_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "ingest.max_concurrency must be at least 1".to_string(),
        ));
    }

    Ok(())
}
