//! Common test utilities for in-process API testing with mocks.
//!
//! The fixture builds the real router over a mock catalog and either a
//! SQLite store in a temporary directory or an in-memory mock store with
//! failure injection.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use coursedex_core::{
    testing::{MockCourseCatalog, MockCourseStore},
    Config, CourseCatalog, CourseStore, DatabaseConfig, IngestConfig, SqliteCourseStore,
};
use coursedex_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use coursedex_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ingest() {
///     let fixture = TestFixture::new().await;
///     fixture.catalog.set_courses("rust", vec![fixtures::course("Rust 101", &[])]).await;
///
///     let response = fixture.post("/search?query=rust").await;
///     assert_status!(response, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure catalog responses
    pub catalog: Arc<MockCourseCatalog>,
    /// The store behind the router
    pub store: Arc<dyn CourseStore>,
    /// Set when the fixture runs over the mock store
    pub mock_store: Option<Arc<MockCourseStore>>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Fixture over a SQLite database file.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = test_config(&temp_dir);
        let store: Arc<dyn CourseStore> = Arc::new(
            SqliteCourseStore::new(&config.database).expect("Failed to create course store"),
        );
        Self::build(config, store, None, temp_dir)
    }

    /// Fixture over the mock store, for failure injection.
    pub async fn with_mock_store() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = test_config(&temp_dir);
        let mock_store = Arc::new(MockCourseStore::new());
        let store = Arc::clone(&mock_store) as Arc<dyn CourseStore>;
        Self::build(config, store, Some(mock_store), temp_dir)
    }

    fn build(
        config: Config,
        store: Arc<dyn CourseStore>,
        mock_store: Option<Arc<MockCourseStore>>,
        temp_dir: TempDir,
    ) -> Self {
        let catalog = Arc::new(MockCourseCatalog::new());
        let state = Arc::new(AppState::new(
            &config,
            Arc::clone(&catalog) as Arc<dyn CourseCatalog>,
            Arc::clone(&store),
        ));

        Self {
            router: create_router(state),
            catalog,
            store,
            mock_store,
            temp_dir,
        }
    }

    /// The mock store; panics for SQLite-backed fixtures.
    pub fn mock_store(&self) -> &MockCourseStore {
        self.mock_store
            .as_deref()
            .expect("fixture was not built with_mock_store")
    }

    /// Send a GET request to the test router.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request with an empty body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        database: DatabaseConfig {
            path: temp_dir.path().join("test.db"),
            max_open: 4,
            max_idle: 1,
            ..Default::default()
        },
        ingest: IngestConfig { max_concurrency: 4 },
        ..Default::default()
    }
}

/// Assert the response status, printing the body on mismatch.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $expected:expr) => {
        assert_eq!(
            $response.status, $expected,
            "Expected status {} but got {}. Body: {}",
            $expected, $response.status, $response.text
        );
    };
}
