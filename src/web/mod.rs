//! Web server module
//!
//! Provides the JSON HTTP API for websearch-rs.

mod handlers;
mod routes;
mod state;

pub use handlers::{ApiError, SearchRequest, SearchResponse};
pub use routes::create_router;
pub use state::AppState;
