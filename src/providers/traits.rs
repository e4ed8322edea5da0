//! Provider traits and types

use crate::results::ResultItem;
use crate::search::SearchParams;
use async_trait::async_trait;

/// Capability every search provider adapter implements
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name, used as the key of its results
    fn name(&self) -> &str;

    /// Short description of the provider
    fn about(&self) -> ProviderAbout {
        ProviderAbout::default()
    }

    /// Whether the provider is configured well enough to serve requests.
    /// Checked once, when the provider is registered.
    fn is_available(&self) -> bool;

    /// Run a search. Results are ordered by `position`, starting at 1.
    ///
    /// `params` carries paging/size hints such as `num` and `start`; providers
    /// ignore parameters they do not understand.
    async fn search(&self, query: &str, params: &SearchParams) -> anyhow::Result<Vec<ResultItem>>;
}

/// Provider metadata
#[derive(Debug, Clone, Default)]
pub struct ProviderAbout {
    /// One-line description
    pub description: Option<String>,
    /// Website URL
    pub website: Option<String>,
    /// Whether an API key is required
    pub require_api_key: bool,
}

impl ProviderAbout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn website(mut self, url: impl Into<String>) -> Self {
        self.website = Some(url.into());
        self
    }

    pub fn api_key_required(mut self, required: bool) -> Self {
        self.require_api_key = required;
        self
    }
}
