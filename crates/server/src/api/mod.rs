pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod search;

pub use routes::create_router;

use serde::Serialize;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
