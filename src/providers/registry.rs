//! Provider registry for managing the dispatchable search providers

use super::traits::{Provider, ProviderAbout};
use crate::config::ProviderConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Registry of available search providers, in registration order
pub struct ProviderRegistry {
    /// Providers in registration order
    providers: Vec<Arc<dyn Provider>>,
    /// Position of each provider by name
    index: HashMap<String, usize>,
    /// Provider configurations
    configs: HashMap<String, ProviderConfig>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            index: HashMap::new(),
            configs: HashMap::new(),
        }
    }

    /// Register a provider.
    ///
    /// Providers reporting themselves unavailable are not registered and
    /// `false` is returned; availability is not checked again later.
    /// Registering a name twice replaces the earlier provider in place.
    pub fn register(&mut self, provider: Arc<dyn Provider>, config: ProviderConfig) -> bool {
        let name = provider.name().to_string();

        if !provider.is_available() {
            info!("Provider {} is not available, skipping", name);
            return false;
        }

        match self.index.get(&name) {
            Some(&position) => {
                warn!("Provider {} registered twice, replacing", name);
                self.providers[position] = provider;
            }
            None => {
                self.index.insert(name.clone(), self.providers.len());
                self.providers.push(provider);
            }
        }
        self.configs.insert(name, config);
        true
    }

    /// Get a provider by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Provider>> {
        self.index.get(name).map(|&i| &self.providers[i])
    }

    /// Provider metadata, with the configured description taking precedence
    pub fn about(&self, name: &str) -> Option<ProviderAbout> {
        let mut about = self.get(name)?.about();
        if let Some(description) = self.configs.get(name).and_then(|c| c.description.clone()) {
            about.description = Some(description);
        }
        Some(about)
    }

    /// Iterate providers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.iter()
    }

    /// Get all provider names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Check if a provider exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
