//! Result types shared by providers, the cache and the search orchestrator

mod types;

pub use types::*;
