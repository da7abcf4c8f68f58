//! Query flow: serve stored courses for a search term, enriched with authors.

use std::sync::Arc;

use tracing::debug;

use crate::course::{normalize_query, SearchResults};
use crate::metrics::SEARCH_RESULTS;
use crate::store::{CourseStore, StoreError};

/// Reads courses back out of the store.
pub struct QueryService {
    store: Arc<dyn CourseStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }

    /// Stored courses for `query` (lower-cased), each with its authors.
    ///
    /// Authors are loaded by course row id, so two stored courses with the
    /// same name keep their own author lists.
    pub async fn search(&self, query: &str) -> Result<SearchResults, StoreError> {
        let term = normalize_query(query);
        let store = Arc::clone(&self.store);

        let results = tokio::task::spawn_blocking(move || {
            let rows = store.search_courses(&term)?;

            let mut elements = Vec::with_capacity(rows.len());
            for row in rows {
                let mut course = row.course;
                course.author_ids = store.find_authors_by_course_id(row.id)?;
                elements.push(course);
            }

            debug!(query = %term, count = elements.len(), "Served stored courses");
            Ok::<_, StoreError>(SearchResults { elements })
        })
        .await
        .map_err(|e| StoreError::Internal(format!("query task failed: {}", e)))??;

        SEARCH_RESULTS
            .with_label_values(&[])
            .observe(results.elements.len() as f64);

        Ok(results)
    }
}
