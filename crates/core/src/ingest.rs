//! Ingestion: fetch courses from the catalog and persist them.
//!
//! Each course is persisted as an independent unit of work (course row, then
//! its author rows in order). Units run concurrently up to
//! `ingest.max_concurrency` and the caller awaits all of them; per-course
//! failures are collected into the [`IngestReport`] rather than dropped.
//! There is no transaction around a unit, so a failure after the course
//! insert leaves the course row without (some of) its authors.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::course::{normalize_query, Course};
use crate::external_catalog::{CatalogClientError, CourseCatalog};
use crate::metrics::{AUTHORS_PERSISTED, COURSES_INGESTED};
use crate::store::{CourseStore, StoreError};

/// Errors that fail an ingestion as a whole.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Catalog request failed: {0}")]
    Catalog(#[from] CatalogClientError),
}

impl IngestError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Catalog(e) => e.is_transient(),
        }
    }
}

/// A course that could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestFailure {
    /// Course name.
    pub course: String,
    pub error: String,
    pub transient: bool,
}

/// Overall outcome of an ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Every course was persisted or already present.
    Complete,
    /// Some courses failed.
    Partial,
    /// Every fetched course failed.
    Failed,
}

/// Summary of one ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Normalized search term the courses were stored under.
    pub query: String,
    /// Courses returned by the catalog.
    pub fetched: usize,
    /// Course rows written.
    pub persisted: usize,
    /// Courses already stored for this term.
    pub skipped: usize,
    /// Author rows written.
    pub authors: usize,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    fn new(query: &str, fetched: usize) -> Self {
        Self {
            query: query.to_string(),
            fetched,
            persisted: 0,
            skipped: 0,
            authors: 0,
            failures: Vec::new(),
        }
    }

    pub fn outcome(&self) -> IngestOutcome {
        if self.failures.is_empty() {
            IngestOutcome::Complete
        } else if self.failures.len() == self.fetched {
            IngestOutcome::Failed
        } else {
            IngestOutcome::Partial
        }
    }

    fn record(&mut self, course: String, result: Result<Persisted, StoreError>) {
        match result {
            Ok(Persisted::Written { authors }) => {
                self.persisted += 1;
                self.authors += authors;
                COURSES_INGESTED.with_label_values(&["persisted"]).inc();
                AUTHORS_PERSISTED.inc_by(authors as u64);
            }
            Ok(Persisted::AlreadyStored) => {
                self.skipped += 1;
                COURSES_INGESTED.with_label_values(&["skipped"]).inc();
                debug!(course = %course, "Course already stored, skipped");
            }
            Err(e) => {
                warn!(
                    course = %course,
                    error = %e,
                    transient = e.is_transient(),
                    "Failed to persist course"
                );
                COURSES_INGESTED.with_label_values(&["failed"]).inc();
                self.failures.push(IngestFailure {
                    course,
                    error: e.to_string(),
                    transient: e.is_transient(),
                });
            }
        }
    }
}

enum Persisted {
    Written { authors: usize },
    AlreadyStored,
}

/// Drives catalog results into the course store.
pub struct Ingestor {
    catalog: Arc<dyn CourseCatalog>,
    store: Arc<dyn CourseStore>,
    max_concurrency: usize,
}

impl Ingestor {
    pub fn new(
        catalog: Arc<dyn CourseCatalog>,
        store: Arc<dyn CourseStore>,
        config: &IngestConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    /// Fetch courses for `query` and persist them under the lower-cased term.
    pub async fn ingest(&self, query: &str) -> Result<IngestReport, IngestError> {
        let term = normalize_query(query);
        let courses = self.catalog.search_courses(&term).await?;

        let mut report = IngestReport::new(&term, courses.len());
        if courses.is_empty() {
            info!(query = %term, "Catalog returned no courses");
            return Ok(report);
        }

        let results: Vec<(String, Result<Persisted, StoreError>)> = stream::iter(courses)
            .map(|mut course| {
                course.search_term = term.clone();
                let store = Arc::clone(&self.store);

                async move {
                    let name = course.name.clone();
                    let result =
                        tokio::task::spawn_blocking(move || persist_course(store.as_ref(), &course))
                            .await
                            .unwrap_or_else(|e| {
                                Err(StoreError::Internal(format!("persist task failed: {}", e)))
                            });
                    (name, result)
                }
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        for (course, result) in results {
            report.record(course, result);
        }

        info!(
            query = %report.query,
            fetched = report.fetched,
            persisted = report.persisted,
            skipped = report.skipped,
            authors = report.authors,
            failed = report.failures.len(),
            "Ingestion finished"
        );

        Ok(report)
    }
}

/// Insert one course and then its authors, in catalog order.
fn persist_course(store: &dyn CourseStore, course: &Course) -> Result<Persisted, StoreError> {
    let Some(course_id) = store.insert_course(course)? else {
        return Ok(Persisted::AlreadyStored);
    };

    for author in &course.author_ids {
        store.insert_author(course_id, author, &course.name)?;
    }

    Ok(Persisted::Written {
        authors: course.author_ids.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteCourseStore;
    use crate::testing::{fixtures, MockCourseCatalog, MockCourseStore};

    fn ingestor(
        catalog: &Arc<MockCourseCatalog>,
        store: Arc<dyn CourseStore>,
        max_concurrency: usize,
    ) -> Ingestor {
        Ingestor::new(
            Arc::clone(catalog) as Arc<dyn CourseCatalog>,
            store,
            &IngestConfig { max_concurrency },
        )
    }

    #[tokio::test]
    async fn test_ingest_persists_courses_and_authors() {
        let catalog = Arc::new(MockCourseCatalog::new());
        catalog
            .set_courses(
                "python",
                vec![fixtures::course("Intro to Python", &["alice", "bob"])],
            )
            .await;
        let store = Arc::new(SqliteCourseStore::in_memory().unwrap());

        let report = ingestor(&catalog, store.clone(), 4)
            .ingest("Python")
            .await
            .unwrap();

        assert_eq!(report.query, "python");
        assert_eq!(report.fetched, 1);
        assert_eq!(report.persisted, 1);
        assert_eq!(report.authors, 2);
        assert_eq!(report.outcome(), IngestOutcome::Complete);

        let stored = store.search_courses("python").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].course.search_term, "python");
        assert_eq!(
            store.find_authors_by_course_id(stored[0].id).unwrap(),
            vec!["alice", "bob"]
        );
    }

    #[tokio::test]
    async fn test_ingest_sends_lowercased_query() {
        let catalog = Arc::new(MockCourseCatalog::new());
        let store = Arc::new(MockCourseStore::new());

        ingestor(&catalog, store, 1).ingest("RuSt").await.unwrap();

        assert_eq!(catalog.recorded_queries().await, vec!["rust"]);
    }

    #[tokio::test]
    async fn test_ingest_empty_catalog_writes_nothing() {
        let catalog = Arc::new(MockCourseCatalog::new());
        let store = Arc::new(MockCourseStore::new());

        let report = ingestor(&catalog, store.clone(), 4)
            .ingest("nothing")
            .await
            .unwrap();

        assert_eq!(report.fetched, 0);
        assert_eq!(report.outcome(), IngestOutcome::Complete);
        assert_eq!(store.stats().unwrap(), Default::default());
    }

    #[tokio::test]
    async fn test_ingest_catalog_failure_is_an_error() {
        let catalog = Arc::new(MockCourseCatalog::new());
        catalog
            .set_next_error(CatalogClientError::ApiError {
                status: 503,
                message: "maintenance".to_string(),
            })
            .await;
        let store = Arc::new(MockCourseStore::new());

        let err = ingestor(&catalog, store.clone(), 4)
            .ingest("python")
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Catalog(_)));
        assert!(err.is_transient());
        assert_eq!(store.stats().unwrap(), Default::default());
    }

    #[tokio::test]
    async fn test_ingest_reports_partial_failures() {
        let catalog = Arc::new(MockCourseCatalog::new());
        catalog
            .set_courses(
                "data",
                vec![
                    fixtures::course("Good Course", &["alice"]),
                    fixtures::course("Broken Course", &["bob"]),
                    fixtures::course("Orphaned Course", &["carol"]),
                ],
            )
            .await;
        let store = Arc::new(MockCourseStore::new());
        store.fail_course_insert("Broken Course");
        store.fail_author_insert("Orphaned Course");

        let report = ingestor(&catalog, store.clone(), 2)
            .ingest("data")
            .await
            .unwrap();

        assert_eq!(report.fetched, 3);
        assert_eq!(report.persisted, 1);
        assert_eq!(report.outcome(), IngestOutcome::Partial);

        let mut failed: Vec<&str> = report.failures.iter().map(|f| f.course.as_str()).collect();
        failed.sort();
        assert_eq!(failed, vec!["Broken Course", "Orphaned Course"]);
        assert!(report.failures.iter().all(|f| !f.transient));

        // The orphaned course row stays behind without authors.
        let orphan = store
            .courses()
            .into_iter()
            .find(|c| c.course.name == "Orphaned Course")
            .unwrap();
        assert!(store.find_authors_by_course_id(orphan.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_all_failed_when_store_down() {
        let catalog = Arc::new(MockCourseCatalog::new());
        catalog
            .set_courses("go", fixtures::numbered_courses("Go", 3))
            .await;
        let store = Arc::new(MockCourseStore::new());
        store.set_down(true);

        let report = ingestor(&catalog, store, 8).ingest("go").await.unwrap();

        assert_eq!(report.failures.len(), 3);
        assert!(report.failures.iter().all(|f| f.transient));
        assert_eq!(report.outcome(), IngestOutcome::Failed);
    }

    #[tokio::test]
    async fn test_reingest_skips_existing_courses() {
        let catalog = Arc::new(MockCourseCatalog::new());
        catalog
            .set_courses("go", fixtures::numbered_courses("Go", 2))
            .await;
        let store = Arc::new(SqliteCourseStore::in_memory().unwrap());
        let ingestor = ingestor(&catalog, store.clone(), 2);

        let first = ingestor.ingest("go").await.unwrap();
        let second = ingestor.ingest("go").await.unwrap();

        assert_eq!(first.persisted, 2);
        assert_eq!(second.persisted, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(second.outcome(), IngestOutcome::Complete);
        assert_eq!(store.stats().unwrap().authors, 2);
    }

    #[tokio::test]
    async fn test_same_name_in_one_page_keeps_first_course_only() {
        let catalog = Arc::new(MockCourseCatalog::new());
        catalog
            .set_courses(
                "stats",
                vec![
                    fixtures::course("Statistics", &["alice"]),
                    fixtures::course("Statistics", &["bob", "carol"]),
                ],
            )
            .await;
        let store = Arc::new(SqliteCourseStore::in_memory().unwrap());

        // One worker keeps catalog order, so the first element wins.
        let report = ingestor(&catalog, store.clone(), 1)
            .ingest("stats")
            .await
            .unwrap();

        assert_eq!(report.fetched, 2);
        assert_eq!(report.persisted, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.authors, 1);
        assert_eq!(report.outcome(), IngestOutcome::Complete);

        let stored = store.search_courses("stats").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            store.find_authors_by_course_id(stored[0].id).unwrap(),
            vec!["alice"]
        );
    }

    #[tokio::test]
    async fn test_ingest_many_courses_with_small_pool() {
        let catalog = Arc::new(MockCourseCatalog::new());
        catalog
            .set_courses("ml", fixtures::numbered_courses("ML", 40))
            .await;
        let store = Arc::new(SqliteCourseStore::in_memory().unwrap());

        let report = ingestor(&catalog, store.clone(), 3)
            .ingest("ml")
            .await
            .unwrap();

        assert_eq!(report.persisted, 40);
        assert_eq!(store.stats().unwrap().courses, 40);
    }

    #[test]
    fn test_report_serialization() {
        let mut report = IngestReport::new("rust", 2);
        report.record("A".to_string(), Ok(Persisted::Written { authors: 2 }));
        report.record(
            "B".to_string(),
            Err(StoreError::Pool("timed out".to_string())),
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["query"], "rust");
        assert_eq!(json["persisted"], 1);
        assert_eq!(json["authors"], 2);
        assert_eq!(json["failures"][0]["course"], "B");
        assert_eq!(json["failures"][0]["transient"], true);
        assert_eq!(
            serde_json::to_value(report.outcome()).unwrap(),
            serde_json::json!("partial")
        );
    }
}
