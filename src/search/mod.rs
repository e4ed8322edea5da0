//! Search orchestration module
//!
//! Routes queries to one provider or fans out to all of them, with a
//! cache-aside lookup around every provider call.

mod error;
mod executor;
mod models;

pub use error::SearchError;
pub use executor::SearchOrchestrator;
pub use models::*;
