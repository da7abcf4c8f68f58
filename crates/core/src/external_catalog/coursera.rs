//! Coursera `courses.v1` API client.
//!
//! Only the search finder is used:
//! `GET /api/courses.v1?q=search&query=<term>&fields=description`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::{CatalogClientError, CourseCatalog};
use crate::config::CatalogConfig;
use crate::course::{normalize_query, Course, SearchResults};
use crate::metrics::{CATALOG_REQUESTS, CATALOG_REQUEST_DURATION};

/// Coursera catalog API client.
pub struct CourseraClient {
    client: Client,
    base_url: String,
}

impl CourseraClient {
    /// Create a new Coursera client.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogClientError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Course>, CatalogClientError> {
        let url = format!("{}/api/courses.v1", self.base_url);

        debug!(query = %query, "Catalog search");

        let response = self
            .client
            .get(&url)
            .query(&[("q", "search"), ("query", query), ("fields", "description")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Catalog rate limit exceeded");
            return Err(CatalogClientError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogClientError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let results: SearchResults = serde_json::from_str(&body).map_err(|e| {
            CatalogClientError::ParseError(format!("Failed to parse search response: {}", e))
        })?;

        Ok(results.elements)
    }
}

#[async_trait]
impl CourseCatalog for CourseraClient {
    async fn search_courses(&self, query: &str) -> Result<Vec<Course>, CatalogClientError> {
        let query = normalize_query(query);
        let start = Instant::now();

        let result = self.fetch(&query).await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        CATALOG_REQUESTS.with_label_values(&[outcome]).inc();
        CATALOG_REQUEST_DURATION
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        if let Ok(ref courses) = result {
            debug!(query = %query, count = courses.len(), "Catalog search returned");
        }

        result
    }
}
