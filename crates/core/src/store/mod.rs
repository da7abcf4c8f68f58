//! Course store - local persistence for courses fetched from the catalog.
//!
//! Courses are keyed by the search term that produced them. Authors are
//! stored in their own table, linked to their course by row id and also
//! carrying the course name.

mod sqlite;

pub use sqlite::SqliteCourseStore;

use serde::Serialize;
use thiserror::Error;

use crate::course::{Course, StoredCourse};

/// Maximum number of courses returned by [`CourseStore::search_courses`].
pub const SEARCH_LIMIT: usize = 10;

/// Trait for course storage.
pub trait CourseStore: Send + Sync {
    /// Insert a course row (name, description, search term).
    ///
    /// Returns the generated row id, or `None` when a course with the same
    /// search term and name is already stored.
    fn insert_course(&self, course: &Course) -> Result<Option<i64>, StoreError>;

    /// Insert an author row for the given course.
    fn insert_author(
        &self,
        course_id: i64,
        author_name: &str,
        course_name: &str,
    ) -> Result<i64, StoreError>;

    /// Up to [`SEARCH_LIMIT`] courses whose search term equals `term` exactly,
    /// in insertion order. Authors are not loaded.
    fn search_courses(&self, term: &str) -> Result<Vec<StoredCourse>, StoreError>;

    /// Author names of every author row whose course name equals `name`.
    ///
    /// Two different courses sharing a name get their authors merged here;
    /// use [`CourseStore::find_authors_by_course_id`] to avoid that.
    fn find_authors_by_course_name(&self, name: &str) -> Result<Vec<String>, StoreError>;

    /// Author names linked to a course row, in insertion order.
    fn find_authors_by_course_id(&self, course_id: i64) -> Result<Vec<String>, StoreError>;

    /// Row counts.
    fn stats(&self) -> Result<StoreStats, StoreError>;

    /// Verify the store is reachable.
    fn ping(&self) -> Result<(), StoreError>;
}

/// Store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub courses: u64,
    pub authors: u64,
}

/// Errors for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be checked out of the pool.
    #[error("Connection pool error: {0}")]
    Pool(String),

    /// A checked out connection failed its liveness check.
    #[error("Connection not alive: {0}")]
    Connection(String),

    /// The database is locked by another writer.
    #[error("Database busy: {0}")]
    Busy(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether the same operation could plausibly succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Pool(_) | Self::Connection(_) | Self::Busy(_))
    }
}
