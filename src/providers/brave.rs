//! Brave Search API provider implementation

use super::traits::*;
use crate::config::ProviderConfig;
use crate::network::HttpClient;
use crate::results::ResultItem;
use crate::search::SearchParams;
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Brave Web Search API endpoint
pub const API_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// `source` of every result
pub const SOURCE: &str = "brave";

/// Maximum `count` accepted by the API
const MAX_COUNT: u32 = 20;

/// Maximum `offset` (page index) accepted by the API
const MAX_OFFSET: u32 = 9;

const DEFAULT_COUNT: u32 = 10;

/// Brave web search provider
pub struct Brave {
    name: String,
    api_key: Option<String>,
    base_url: String,
    client: HttpClient,
}

impl Brave {
    pub fn new(config: &ProviderConfig, client: HttpClient) -> Result<Self> {
        let base_url = match config.base_url.as_deref() {
            Some(url) => url::Url::parse(url)?.to_string(),
            None => API_ENDPOINT.to_string(),
        };

        Ok(Self {
            name: config.name.clone(),
            api_key: config.api_key().map(str::to_string),
            base_url,
            client,
        })
    }

    /// Build the query string for a request.
    ///
    /// Brave pages by page index rather than item index, so a 1-based
    /// `start` is converted using the page size.
    fn build_params(&self, query: &str, params: &SearchParams) -> Vec<(&'static str, String)> {
        let count = params.num().unwrap_or(DEFAULT_COUNT).clamp(1, MAX_COUNT);
        let mut query_params = vec![("q", query.to_string()), ("count", count.to_string())];

        if let Some(start) = params.start().filter(|&s| s > 1) {
            let offset = ((start - 1) / count).min(MAX_OFFSET);
            query_params.push(("offset", offset.to_string()));
        }

        query_params
    }

    fn parse_response(&self, response: BraveResponse) -> Vec<ResultItem> {
        let results = response.web.map(|w| w.results).unwrap_or_default();

        results
            .into_iter()
            .zip(1u32..)
            .map(|(result, position)| {
                let mut item =
                    ResultItem::new(result.title, result.url, result.description, SOURCE, position)
                        .with_info("age", result.age);
                if !result.extra_snippets.is_empty() {
                    item = item.with_info("extra_snippets", result.extra_snippets);
                }
                item
            })
            .collect()
    }
}

#[async_trait]
impl Provider for Brave {
    fn name(&self) -> &str {
        &self.name
    }

    fn about(&self) -> ProviderAbout {
        ProviderAbout::new()
            .description("Brave Search API")
            .website("https://search.brave.com")
            .api_key_required(true)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<ResultItem>> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("Brave provider {} is missing api_key", self.name);
        };

        let query_params = self.build_params(query, params);
        let response: BraveResponse = self
            .client
            .get_json(
                &self.base_url,
                &query_params,
                &[("X-Subscription-Token", api_key)],
            )
            .await?;

        Ok(self.parse_response(response))
    }
}

/// Web search API response
#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    extra_snippets: Vec<String>,
    age: Option<String>,
}
