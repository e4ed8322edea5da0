//! websearch-rs: a caching web search aggregator
//!
//! Fans a query out to the configured search providers (or to a single one),
//! keeps each provider's results in a TTL cache, and serves the combined
//! results over a small JSON API.

pub mod cache;
pub mod config;
pub mod network;
pub mod providers;
pub mod results;
pub mod search;
pub mod web;

pub use cache::CacheStore;
pub use config::Settings;
pub use providers::Provider;
pub use results::{ProviderResults, ResultItem};
pub use search::{SearchError, SearchOrchestrator, SearchParams, SearchQuery};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for provider requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 10;
