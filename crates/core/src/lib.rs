pub mod config;
pub mod course;
pub mod external_catalog;
pub mod ingest;
pub mod metrics;
pub mod query;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, CatalogConfig, Config, ConfigError,
    DatabaseConfig, IngestConfig, ServerConfig,
};
pub use course::{normalize_query, Course, SearchResults, StoredCourse};
pub use external_catalog::{CatalogClientError, CourseCatalog, CourseraClient};
pub use ingest::{IngestError, IngestFailure, IngestOutcome, IngestReport, Ingestor};
pub use query::QueryService;
pub use store::{CourseStore, SqliteCourseStore, StoreError, StoreStats, SEARCH_LIMIT};
