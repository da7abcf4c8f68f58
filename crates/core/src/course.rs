//! Course records shared by the catalog client, the store and the HTTP layer.
//!
//! The serialized field names follow the catalog API payload
//! (`name`, `description`, `instructorIds`) plus the `Search` key under which
//! a course was ingested, so the same shape is read from the catalog and
//! written back out on `GET /search`.

use serde::{Deserialize, Deserializer, Serialize};

/// A course as returned by the catalog and as served from the local store.
///
/// Missing and `null` fields decode as empty, so one sparse element never
/// fails the rest of a catalog page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Search term that produced this course (lower-cased).
    #[serde(rename = "Search", default, deserialize_with = "null_as_default")]
    pub search_term: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Instructor identifiers, in catalog order.
    #[serde(
        rename = "instructorIds",
        default,
        deserialize_with = "null_as_default"
    )]
    pub author_ids: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Course {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.author_ids = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }
}

/// A course row read back from the store together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCourse {
    pub id: i64,
    pub course: Course,
}

/// Response envelope shared by the catalog API and `GET /search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default, deserialize_with = "null_as_default")]
    pub elements: Vec<Course>,
}

/// Normalizes a search term the way it is stored: lower-cased.
pub fn normalize_query(query: &str) -> String {
    query.to_lowercase()
}
