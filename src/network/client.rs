//! HTTP client for making requests to search providers

use crate::config::OutgoingSettings;
use anyhow::{anyhow, bail, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// Longest slice of an error body kept in error messages
const ERROR_BODY_EXCERPT: usize = 200;

/// HTTP client wrapper with provider-facing defaults
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(settings.request_timeout)
            .map_err(|e| anyhow!("Invalid request_timeout {}: {}", settings.request_timeout, e))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(settings.useragent.clone())
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            default_timeout: timeout,
            user_agent: settings.useragent.clone(),
            extra_headers: settings.extra_headers.clone(),
        })
    }

    /// GET `url` with query parameters and headers, decoding a JSON body.
    ///
    /// Non-2xx responses are errors carrying the status and a body excerpt.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<T> {
        let mut req_builder = self.client.get(url).header("Accept", "application/json");

        for (key, value) in &self.extra_headers {
            req_builder = req_builder.header(key, value);
        }
        for (key, value) in headers {
            req_builder = req_builder.header(*key, *value);
        }
        if !params.is_empty() {
            req_builder = req_builder.query(params);
        }

        let response = req_builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
            bail!("HTTP error {}: {}", status.as_u16(), excerpt.trim());
        }

        Ok(response.json::<T>().await?)
    }

    /// Timeout applied to every request
    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
