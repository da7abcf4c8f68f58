use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides. Nested keys use `__`, so
/// `COURSEDEX_DATABASE__MAX_OPEN=4` sets `database.max_open`.
const ENV_PREFIX: &str = "COURSEDEX_";

/// Read the config file at `path`, then layer `COURSEDEX_*` variables on top.
///
/// The file must exist; every section inside it is optional.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parse a TOML document without consulting the environment.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sections_default_independently() {
        let config = load_config_from_str(
            r#"
[ingest]
max_concurrency = 3
"#,
        )
        .unwrap();

        assert_eq!(config.ingest.max_concurrency, 3);
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.database.max_open, 10);
        assert_eq!(config.catalog.base_url, "https://api.coursera.org");
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = load_config_from_str("[database\nmax_open = 1");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let result = load_config_from_str("[database]\nmax_open = \"many\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_config(Path::new("/nonexistent/coursedex.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
        assert!(err.to_string().contains("/nonexistent/coursedex.toml"));
    }

    #[test]
    fn test_load_pool_and_catalog_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3000

[database]
path = "courses.db"
max_open = 4
max_idle = 2
max_lifetime_secs = 0

[catalog]
base_url = "http://localhost:9999/"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.database.path, Path::new("courses.db"));
        assert_eq!(config.database.max_open, 4);
        assert_eq!(config.database.max_idle, 2);
        assert_eq!(config.database.max_lifetime_secs, 0);
        assert_eq!(config.catalog.base_url, "http://localhost:9999/");
    }
}
