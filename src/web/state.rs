//! Application state shared across handlers

use crate::cache::CacheStore;
use crate::config::Settings;
use crate::providers::ProviderRegistry;
use crate::search::SearchOrchestrator;
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Settings loaded at startup
    pub settings: Arc<Settings>,
    /// Search orchestrator, owning the provider registry and result cache
    pub search: Arc<SearchOrchestrator>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, registry: ProviderRegistry) -> anyhow::Result<Self> {
        let timeout = Duration::try_from_secs_f64(settings.outgoing.request_timeout)
            .map_err(|e| anyhow!("Invalid request_timeout: {}", e))?;
        let cache = Arc::new(CacheStore::new(settings.cache.ttl));
        let search = SearchOrchestrator::new(Arc::new(registry), cache).with_timeout(timeout);

        Ok(Self::with_search(settings, search))
    }

    /// Create state around an existing orchestrator
    pub fn with_search(settings: Settings, search: SearchOrchestrator) -> Self {
        Self {
            settings: Arc::new(settings),
            search: Arc::new(search),
        }
    }

    /// Whether the result cache is switched on for this instance
    pub fn cache_enabled(&self) -> bool {
        self.settings.cache.enabled
    }
}
