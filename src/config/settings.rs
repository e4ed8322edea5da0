//! Settings structures for websearch-rs configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub outgoing: OutgoingSettings,
    pub providers: Vec<ProviderConfig>,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with process environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary variable source
    pub fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("APP_ENV") {
            self.general.app_env = val;
        }
        if let Some(val) = var("DEBUG") {
            self.general.debug = parse_flag(&val);
        }
        if let Some(val) = var("PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("CACHE_ENABLED") {
            self.cache.enabled = parse_flag(&val);
        }
        if let Some(val) = var("CACHE_TTL") {
            if let Ok(ttl) = val.parse() {
                self.cache.ttl = ttl;
            }
        }

        let google_key = var("GOOGLE_API_KEY");
        let google_cse = var("GOOGLE_CSE_ID");
        if google_key.is_some() || google_cse.is_some() {
            let google = self.provider_entry("google");
            if google_key.is_some() {
                google.api_key = google_key;
            }
            if google_cse.is_some() {
                google.cse_id = google_cse;
            }
        }
        if let Some(key) = var("BRAVE_API_KEY") {
            self.provider_entry("brave").api_key = Some(key);
        }
    }

    /// Provider config by name, created with the same provider type if missing
    fn provider_entry(&mut self, name: &str) -> &mut ProviderConfig {
        let index = match self.providers.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                self.providers.push(ProviderConfig::new(name, name));
                self.providers.len() - 1
            }
        };
        &mut self.providers[index]
    }
}

/// Parse a boolean flag: `true`, `1` or `t` in any case, anything else is false
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "t")
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Deployment environment name, reported by /health
    pub app_env: String,
    /// Enable debug logging
    pub debug: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            app_env: "development".to_string(),
            debug: false,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Result cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Master switch; requests can only opt out, never back in
    pub enabled: bool,
    /// Default entry lifetime in seconds
    pub ttl: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: crate::cache::DEFAULT_TTL,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Per-provider request timeout in seconds
    pub request_timeout: f64,
    /// User agent sent to providers
    pub useragent: String,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            useragent: format!("websearch-rs/{}", crate::VERSION),
            extra_headers: HashMap::new(),
        }
    }
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name (unique identifier, used as result key)
    pub name: String,
    /// Provider implementation to use
    pub provider: String,
    /// Whether the provider should be loaded
    pub enabled: bool,
    /// API key if required
    pub api_key: Option<String>,
    /// Google custom search engine id
    pub cse_id: Option<String>,
    /// Override the provider's API endpoint
    pub base_url: Option<String>,
    /// Serve synthetic results without network access
    pub mock: bool,
    /// Human readable description
    pub description: Option<String>,
    /// Additional provider-specific settings
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// API key, ignoring empty strings and the sample placeholder
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.starts_with("your_"))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            provider: String::new(),
            enabled: true,
            api_key: None,
            cse_id: None,
            base_url: None,
            mock: false,
            description: None,
            extra: HashMap::new(),
        }
    }
}
