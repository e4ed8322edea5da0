//! Search execution and orchestration

use super::error::SearchError;
use super::models::{SearchOutcome, SearchParams, SearchQuery};
use crate::cache::{CacheStats, CacheStore};
use crate::providers::{Provider, ProviderRegistry};
use crate::results::{mark_provenance, ProviderResults, ResultItem};
use anyhow::bail;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Search orchestrator that coordinates searching across providers
pub struct SearchOrchestrator {
    /// Provider registry, fixed at construction
    registry: Arc<ProviderRegistry>,
    /// Result cache shared by every provider call
    cache: Arc<CacheStore>,
    /// Upper bound for a single provider call
    timeout: Duration,
}

impl SearchOrchestrator {
    /// Create a new orchestrator
    pub fn new(registry: Arc<ProviderRegistry>, cache: Arc<CacheStore>) -> Self {
        Self {
            registry,
            cache,
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT),
        }
    }

    /// Set the per-provider timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Registered provider names, in registration order
    pub fn available_providers(&self) -> Vec<String> {
        self.registry.names().into_iter().map(str::to_string).collect()
    }

    /// Get a provider by name
    pub fn get_provider(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.registry.get(name).cloned()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn clear_expired_cache(&self) -> usize {
        self.cache.clear_expired()
    }

    /// Execute a search query
    pub async fn execute(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
        self.search_outcome(
            &query.query,
            query.provider.as_deref(),
            query.use_cache,
            &query.params,
        )
        .await
    }

    /// Search one provider, or every registered provider when `provider`
    /// is `None`.
    ///
    /// `use_cache` applies to the whole call. A failing provider fails the
    /// call only when it was requested explicitly; during fan-out its result
    /// list is left empty.
    pub async fn search(
        &self,
        query: &str,
        provider: Option<&str>,
        use_cache: bool,
        params: &SearchParams,
    ) -> Result<ProviderResults, SearchError> {
        self.search_outcome(query, provider, use_cache, params)
            .await
            .map(|outcome| outcome.results)
    }

    /// Like [`search`](Self::search), also reporting which providers were
    /// answered from the cache
    pub async fn search_outcome(
        &self,
        query: &str,
        provider: Option<&str>,
        use_cache: bool,
        params: &SearchParams,
    ) -> Result<SearchOutcome, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidRequest(
                "search query must not be empty".to_string(),
            ));
        }

        match provider {
            Some(name) => {
                let provider = self
                    .registry
                    .get(name)
                    .cloned()
                    .ok_or_else(|| SearchError::UnknownProvider(name.to_string()))?;

                let (items, from_cache) = self
                    .search_provider(provider, query, use_cache, params)
                    .await
                    .map_err(|e| {
                        error!("Provider {} failed for '{}': {:#}", name, query, e);
                        SearchError::Provider {
                            provider: name.to_string(),
                            message: format!("{:#}", e),
                        }
                    })?;

                let mut cached_providers = HashSet::new();
                if from_cache {
                    cached_providers.insert(name.to_string());
                }

                Ok(SearchOutcome {
                    results: HashMap::from([(name.to_string(), items)]),
                    cached_providers,
                })
            }
            None => Ok(self.fan_out(query, use_cache, params).await),
        }
    }

    /// Search every registered provider concurrently
    async fn fan_out(&self, query: &str, use_cache: bool, params: &SearchParams) -> SearchOutcome {
        let futures: Vec<_> = self
            .registry
            .iter()
            .map(|provider| {
                let provider = provider.clone();
                async move {
                    let name = provider.name().to_string();
                    match self.search_provider(provider, query, use_cache, params).await {
                        Ok((items, from_cache)) => (name, items, from_cache),
                        Err(e) => {
                            warn!("Provider {} failed for '{}': {:#}", name, query, e);
                            (name, Vec::new(), false)
                        }
                    }
                }
            })
            .collect();

        info!(
            "Executing search '{}' on {} providers",
            query,
            futures.len()
        );

        let mut outcome = SearchOutcome::default();
        for (name, items, from_cache) in join_all(futures).await {
            if from_cache {
                outcome.cached_providers.insert(name.clone());
            }
            outcome.results.insert(name, items);
        }
        outcome
    }

    /// Cache-aside search of a single provider, flagging cache hits
    async fn search_provider(
        &self,
        provider: Arc<dyn Provider>,
        query: &str,
        use_cache: bool,
        params: &SearchParams,
    ) -> anyhow::Result<(Vec<ResultItem>, bool)> {
        let name = provider.name();

        if use_cache {
            if let Some(items) = self.cache.get(query, Some(name), params) {
                debug!("Cache hit for provider {} ({} results)", name, items.len());
                return Ok((items, true));
            }
            debug!("Cache miss for provider {}", name);
        }

        let start = Instant::now();
        let mut items = match timeout(self.timeout, provider.search(query, params)).await {
            Ok(result) => result?,
            Err(_) => bail!("timed out after {:?}", self.timeout),
        };
        mark_provenance(&mut items, false);

        debug!(
            "Provider {} returned {} results in {:?}",
            name,
            items.len(),
            start.elapsed()
        );

        if use_cache {
            self.cache.set(query, items.clone(), None, Some(name), params);
        }

        Ok((items, false))
    }
}
