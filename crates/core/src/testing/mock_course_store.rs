//! Mock course store for testing.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::course::{Course, StoredCourse};
use crate::store::{CourseStore, StoreError, StoreStats, SEARCH_LIMIT};

#[derive(Debug, Clone)]
struct AuthorRow {
    course_id: i64,
    author: String,
    course_name: String,
}

#[derive(Debug, Default)]
struct Inner {
    courses: Vec<StoredCourse>,
    authors: Vec<AuthorRow>,
    failing_courses: HashSet<String>,
    failing_author_courses: HashSet<String>,
    down: bool,
}

/// In-memory implementation of the CourseStore trait.
///
/// Mirrors the SQLite store's semantics (unique search/name pairs, the
/// search limit, insertion-ordered authors) and adds failure injection:
/// - fail the course insert for a given course name
/// - fail author inserts for a given course name (leaves the course row)
/// - take the whole store down (every call fails as a dead connection)
#[derive(Debug, Default)]
pub struct MockCourseStore {
    inner: Mutex<Inner>,
}

impl MockCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `insert_course` fail for courses with this name.
    pub fn fail_course_insert(&self, course_name: &str) {
        self.lock().failing_courses.insert(course_name.to_string());
    }

    /// Make `insert_author` fail for authors of courses with this name.
    pub fn fail_author_insert(&self, course_name: &str) {
        self.lock()
            .failing_author_courses
            .insert(course_name.to_string());
    }

    /// Toggle whether every operation fails as if the connection were dead.
    pub fn set_down(&self, down: bool) {
        self.lock().down = down;
    }

    /// All stored courses, in insertion order.
    pub fn courses(&self) -> Vec<StoredCourse> {
        self.lock().courses.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_alive(inner: &Inner) -> Result<(), StoreError> {
        if inner.down {
            return Err(StoreError::Connection("mock store is down".to_string()));
        }
        Ok(())
    }
}

impl CourseStore for MockCourseStore {
    fn insert_course(&self, course: &Course) -> Result<Option<i64>, StoreError> {
        let mut inner = self.lock();
        Self::check_alive(&inner)?;

        if inner.failing_courses.contains(&course.name) {
            return Err(StoreError::Database(format!(
                "injected failure inserting {}",
                course.name
            )));
        }

        let exists = inner
            .courses
            .iter()
            .any(|c| c.course.search_term == course.search_term && c.course.name == course.name);
        if exists {
            return Ok(None);
        }

        let id = inner.courses.len() as i64 + 1;
        let mut stored = course.clone();
        stored.author_ids.clear();
        inner.courses.push(StoredCourse { id, course: stored });
        Ok(Some(id))
    }

    fn insert_author(
        &self,
        course_id: i64,
        author_name: &str,
        course_name: &str,
    ) -> Result<i64, StoreError> {
        let mut inner = self.lock();
        Self::check_alive(&inner)?;

        if inner.failing_author_courses.contains(course_name) {
            return Err(StoreError::Database(format!(
                "injected failure inserting author of {}",
                course_name
            )));
        }
        if !inner.courses.iter().any(|c| c.id == course_id) {
            return Err(StoreError::Database(format!(
                "FOREIGN KEY constraint failed: course {}",
                course_id
            )));
        }

        inner.authors.push(AuthorRow {
            course_id,
            author: author_name.to_string(),
            course_name: course_name.to_string(),
        });
        Ok(inner.authors.len() as i64)
    }

    fn search_courses(&self, term: &str) -> Result<Vec<StoredCourse>, StoreError> {
        let inner = self.lock();
        Self::check_alive(&inner)?;

        Ok(inner
            .courses
            .iter()
            .filter(|c| c.course.search_term == term)
            .take(SEARCH_LIMIT)
            .cloned()
            .collect())
    }

    fn find_authors_by_course_name(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.lock();
        Self::check_alive(&inner)?;

        Ok(inner
            .authors
            .iter()
            .filter(|a| a.course_name == name)
            .map(|a| a.author.clone())
            .collect())
    }

    fn find_authors_by_course_id(&self, course_id: i64) -> Result<Vec<String>, StoreError> {
        let inner = self.lock();
        Self::check_alive(&inner)?;

        Ok(inner
            .authors
            .iter()
            .filter(|a| a.course_id == course_id)
            .map(|a| a.author.clone())
            .collect())
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let inner = self.lock();
        Self::check_alive(&inner)?;

        Ok(StoreStats {
            courses: inner.courses.len() as u64,
            authors: inner.authors.len() as u64,
        })
    }

    fn ping(&self) -> Result<(), StoreError> {
        Self::check_alive(&self.lock())
    }
}
