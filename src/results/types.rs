//! Result type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single search hit returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Title of the hit
    pub title: String,
    /// URL of the hit
    pub link: String,
    /// Content snippet/description
    pub snippet: String,
    /// Provider that returned this hit
    pub source: String,
    /// 1-based rank within the provider's result set
    pub position: u32,
    /// Provider-specific metadata
    #[serde(default)]
    pub additional_info: HashMap<String, serde_json::Value>,
    /// Whether this hit was served from the result cache.
    /// Set by the orchestrator, never by a provider.
    #[serde(default)]
    pub is_from_cache: bool,
}

impl ResultItem {
    /// Create a new result
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
        source: impl Into<String>,
        position: u32,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
            source: source.into(),
            position,
            additional_info: HashMap::new(),
            is_from_cache: false,
        }
    }

    /// Attach a metadata value; `null` values are skipped
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.additional_info.insert(key.into(), value);
        }
        self
    }
}

/// Results of one search, keyed by provider name
pub type ProviderResults = HashMap<String, Vec<ResultItem>>;

/// Set the provenance flag on a whole batch
pub(crate) fn mark_provenance(items: &mut [ResultItem], from_cache: bool) {
    for item in items {
        item.is_from_cache = from_cache;
    }
}
