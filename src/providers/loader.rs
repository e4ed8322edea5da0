//! Provider loader for initializing providers from configuration

use super::registry::ProviderRegistry;
use super::traits::Provider;
use super::{brave, google};
use crate::config::{ProviderConfig, Settings};
use crate::network::HttpClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing providers from configuration
pub struct ProviderLoader;

impl ProviderLoader {
    /// Load all enabled providers from settings.
    ///
    /// Providers that fail to build or report themselves unavailable are
    /// skipped, so the registry may be empty.
    pub fn load(settings: &Settings, client: &HttpClient) -> Result<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();

        for config in &settings.providers {
            if !config.enabled {
                info!("Skipping disabled provider: {}", config.name);
                continue;
            }

            match Self::create_provider(config, client.clone()) {
                Ok(provider) => {
                    if registry.register(provider, config.clone()) {
                        info!("Loaded provider: {} ({})", config.name, config.provider);
                    }
                }
                Err(e) => {
                    warn!("Failed to load provider {}: {}", config.name, e);
                }
            }
        }

        info!("Loaded {} providers", registry.len());
        Ok(registry)
    }

    /// Create a provider instance by type
    fn create_provider(config: &ProviderConfig, client: HttpClient) -> Result<Arc<dyn Provider>> {
        let provider: Arc<dyn Provider> = match config.provider.as_str() {
            "google" => Arc::new(google::Google::new(config, client)?),
            "brave" => Arc::new(brave::Brave::new(config, client)?),
            other => {
                return Err(anyhow::anyhow!("Unknown provider type: {}", other));
            }
        };

        Ok(provider)
    }
}
