//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the catalog and store
//! traits, allowing flow and HTTP tests without network or database access.
//!
//! # Example
//!
//! ```rust,ignore
//! use coursedex_core::testing::{fixtures, MockCourseCatalog, MockCourseStore};
//!
//! let catalog = MockCourseCatalog::new();
//! let store = MockCourseStore::new();
//!
//! // Configure mock responses
//! catalog.set_courses("rust", vec![fixtures::course("Rust 101", &["ferris"])]).await;
//! store.fail_author_insert("Rust 101");
//!
//! // Use in an Ingestor or AppState...
//! ```

mod mock_course_catalog;
mod mock_course_store;

pub use mock_course_catalog::MockCourseCatalog;
pub use mock_course_store::MockCourseStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::course::Course;

    /// Create a catalog course with a generated description and the given authors.
    pub fn course(name: &str, authors: &[&str]) -> Course {
        Course::new(name, format!("A course about {}.", name.to_lowercase()))
            .with_authors(authors.iter().copied())
    }

    /// Create `count` numbered courses, each with one author.
    pub fn numbered_courses(prefix: &str, count: usize) -> Vec<Course> {
        (1..=count)
            .map(|i| {
                let author = format!("instructor-{}", i);
                course(&format!("{} {}", prefix, i), &[author.as_str()])
            })
            .collect()
    }
}
