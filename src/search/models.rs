//! Search query and related data models

use crate::results::ProviderResults;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Paging/size parameters that accompany a query.
///
/// Forwarded verbatim to providers and to cache key derivation, so a cached
/// result set is specific to one parameter combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchParams(HashMap<String, serde_json::Value>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    /// Parameters sorted by name
    pub fn sorted(&self) -> Vec<(&String, &serde_json::Value)> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read a parameter as an unsigned integer, accepting numeric strings
    pub fn get_u32(&self, name: &str) -> Option<u32> {
        match self.0.get(name)? {
            serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Requested number of results (`num`)
    pub fn num(&self) -> Option<u32> {
        self.get_u32("num")
    }

    /// Requested 1-based start index (`start`)
    pub fn start(&self) -> Option<u32> {
        self.get_u32("start")
    }
}

impl From<HashMap<String, serde_json::Value>> for SearchParams {
    fn from(map: HashMap<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, serde_json::Value)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Complete search request with all parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search query string
    pub query: String,
    /// Provider to search; `None` fans out to every registered provider
    pub provider: Option<String>,
    /// Consult and populate the result cache
    pub use_cache: bool,
    /// Paging/size parameters
    #[serde(default)]
    pub params: SearchParams,
}

impl SearchQuery {
    /// Create a fan-out query with the cache enabled and no parameters
    pub fn simple(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            provider: None,
            use_cache: true,
            params: SearchParams::new(),
        }
    }

    /// Restrict the query to one provider
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Enable or bypass the cache for this query
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Add a paging/size parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(name, value);
        self
    }
}

/// Results of a search together with the providers answered from the cache
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub results: ProviderResults,
    /// Providers served from the cache, including cached empty result sets
    pub cached_providers: HashSet<String>,
}

impl SearchOutcome {
    /// Whether any provider was served from the cache
    pub fn cache_used(&self) -> bool {
        !self.cached_providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_query() {
        let query = SearchQuery::simple("hello world");
        assert_eq!(query.query, "hello world");
        assert!(query.provider.is_none());
        assert!(query.use_cache);
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_query_builder() {
        let query = SearchQuery::simple("test")
            .with_provider("google")
            .with_cache(false)
            .with_param("num", 5)
            .with_param("start", 11);

        assert_eq!(query.provider.as_deref(), Some("google"));
        assert!(!query.use_cache);
        assert_eq!(query.params.num(), Some(5));
        assert_eq!(query.params.start(), Some(11));
    }

    #[test]
    fn test_params_numeric_coercion() {
        let params = SearchParams::new()
            .with("num", "7")
            .with("start", -1)
            .with("lang", "en");

        assert_eq!(params.num(), Some(7));
        assert_eq!(params.start(), None);
        assert_eq!(params.get_u32("lang"), None);
    }

    #[test]
    fn test_params_sorted() {
        let params = SearchParams::new().with("start", 1).with("num", 10).with("lang", "en");
        let names: Vec<_> = params.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["lang", "num", "start"]);
    }
}
