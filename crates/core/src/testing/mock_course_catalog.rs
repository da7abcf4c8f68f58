//! Mock course catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::course::{normalize_query, Course};
use crate::external_catalog::{CatalogClientError, CourseCatalog};

/// Mock implementation of the CourseCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable courses per (lower-cased) query
/// - Track queries for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use coursedex_core::testing::{fixtures, MockCourseCatalog};
///
/// let catalog = MockCourseCatalog::new();
/// catalog
///     .set_courses("python", vec![fixtures::course("Intro to Python", &["alice"])])
///     .await;
///
/// let courses = catalog.search_courses("Python").await?;
/// assert_eq!(courses.len(), 1);
/// assert_eq!(catalog.recorded_queries().await, vec!["python"]);
/// ```
#[derive(Debug, Default)]
pub struct MockCourseCatalog {
    /// Courses returned per normalized query.
    courses: Arc<RwLock<HashMap<String, Vec<Course>>>>,
    /// Recorded (normalized) queries.
    queries: Arc<RwLock<Vec<String>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<CatalogClientError>>>,
}

impl MockCourseCatalog {
    /// Create a new empty mock catalog. Unknown queries return no courses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the courses returned for a query.
    pub async fn set_courses(&self, query: &str, courses: Vec<Course>) {
        self.courses
            .write()
            .await
            .insert(normalize_query(query), courses);
    }

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogClientError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl CourseCatalog for MockCourseCatalog {
    async fn search_courses(&self, query: &str) -> Result<Vec<Course>, CatalogClientError> {
        let query = normalize_query(query);
        self.queries.write().await.push(query.clone());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self
            .courses
            .read()
            .await
            .get(&query)
            .cloned()
            .unwrap_or_default())
    }
}
