//! Google Custom Search provider implementation

use super::traits::*;
use crate::config::ProviderConfig;
use crate::network::HttpClient;
use crate::results::ResultItem;
use crate::search::SearchParams;
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Custom Search JSON API endpoint
pub const API_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// `source` of every result, whatever the provider instance is named
pub const SOURCE: &str = "google";

/// The API never returns more than ten items per request
const MAX_RESULTS: u32 = 10;

/// Results served in mock mode when `num` is not given
const MOCK_DEFAULT_RESULTS: u32 = 3;

/// Google Custom Search provider
pub struct Google {
    name: String,
    api_key: Option<String>,
    cse_id: Option<String>,
    base_url: String,
    mock_mode: bool,
    client: HttpClient,
}

impl Google {
    pub fn new(config: &ProviderConfig, client: HttpClient) -> Result<Self> {
        let base_url = match config.base_url.as_deref() {
            Some(url) => url::Url::parse(url)?.to_string(),
            None => API_ENDPOINT.to_string(),
        };

        Ok(Self {
            name: config.name.clone(),
            api_key: config.api_key().map(str::to_string),
            cse_id: config
                .cse_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            base_url,
            mock_mode: config.mock,
            client,
        })
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.cse_id.is_some()
    }

    /// Build the query string for a request
    fn build_params(&self, query: &str, params: &SearchParams) -> Result<Vec<(&'static str, String)>> {
        let (Some(key), Some(cx)) = (&self.api_key, &self.cse_id) else {
            bail!("Google provider {} is missing api_key or cse_id", self.name);
        };

        let mut query_params = vec![
            ("key", key.clone()),
            ("cx", cx.clone()),
            ("q", query.to_string()),
        ];

        let num = params.num().unwrap_or(MAX_RESULTS).clamp(1, MAX_RESULTS);
        query_params.push(("num", num.to_string()));

        if let Some(start) = params.start().filter(|&s| s > 0) {
            query_params.push(("start", start.to_string()));
        }

        Ok(query_params)
    }

    fn parse_response(&self, response: GoogleResponse) -> Vec<ResultItem> {
        response
            .items
            .into_iter()
            .zip(1u32..)
            .map(|(item, position)| {
                ResultItem::new(item.title, item.link, item.snippet, SOURCE, position)
                    .with_info("htmlSnippet", item.html_snippet)
                    .with_info("displayLink", item.display_link)
                    .with_info("formattedUrl", item.formatted_url)
            })
            .collect()
    }

    /// Synthetic results for running without credentials
    fn mock_results(&self, query: &str, params: &SearchParams) -> Vec<ResultItem> {
        let count = params.num().unwrap_or(MOCK_DEFAULT_RESULTS).min(MAX_RESULTS);

        (1..=count)
            .map(|i| {
                ResultItem::new(
                    format!("{} - mock result {}", query, i),
                    format!("https://example.com/result/{}?q={}", i, query),
                    format!(
                        "Mock search result {} for {}. Generated locally for testing, not a real search result.",
                        i, query
                    ),
                    SOURCE,
                    i,
                )
                .with_info("htmlSnippet", format!("Mock search result for <b>{}</b>.", query))
                .with_info("displayLink", "example.com")
                .with_info("formattedUrl", format!("https://example.com/result/{}", i))
            })
            .collect()
    }
}

#[async_trait]
impl Provider for Google {
    fn name(&self) -> &str {
        &self.name
    }

    fn about(&self) -> ProviderAbout {
        ProviderAbout::new()
            .description("Google Custom Search")
            .website("https://programmablesearchengine.google.com")
            .api_key_required(true)
    }

    fn is_available(&self) -> bool {
        self.mock_mode || self.has_credentials()
    }

    async fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<ResultItem>> {
        if self.mock_mode {
            debug!("Google provider {} serving mock results", self.name);
            return Ok(self.mock_results(query, params));
        }

        let query_params = self.build_params(query, params)?;
        let response: GoogleResponse = self
            .client
            .get_json(&self.base_url, &query_params, &[])
            .await?;

        Ok(self.parse_response(response))
    }
}

/// Custom Search API response
#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    html_snippet: Option<String>,
    display_link: Option<String>,
    formatted_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: Option<String>) -> ProviderConfig {
        ProviderConfig {
            api_key: Some("test_api_key".to_string()),
            cse_id: Some("test_cse_id".to_string()),
            base_url,
            ..ProviderConfig::new("google", "google")
        }
    }

    fn google(config: &ProviderConfig) -> Google {
        Google::new(config, HttpClient::new().unwrap()).unwrap()
    }

    #[test]
    fn test_is_available() {
        assert!(google(&config(None)).is_available());

        let mut no_key = config(None);
        no_key.api_key = None;
        assert!(!google(&no_key).is_available());

        let mut no_cse = config(None);
        no_cse.cse_id = Some(String::new());
        assert!(!google(&no_cse).is_available());

        let mut mock = ProviderConfig::new("google", "google");
        mock.mock = true;
        assert!(google(&mock).is_available());
    }

    #[test]
    fn test_build_params() {
        let provider = google(&config(None));
        let params = SearchParams::new().with("num", 25).with("start", 11);
        let query_params = provider.build_params("rust", &params).unwrap();

        assert!(query_params.contains(&("q", "rust".to_string())));
        assert!(query_params.contains(&("num", "10".to_string())));
        assert!(query_params.contains(&("start", "11".to_string())));
        assert!(query_params.contains(&("cx", "test_cse_id".to_string())));
    }

    #[test]
    fn test_build_params_skips_zero_start() {
        let provider = google(&config(None));
        let params = SearchParams::new().with("start", 0);
        let query_params = provider.build_params("rust", &params).unwrap();

        assert!(query_params.iter().all(|(k, _)| *k != "start"));
    }

    #[tokio::test]
    async fn test_search_without_credentials_fails() {
        let mut cfg = config(None);
        cfg.api_key = None;
        let err = google(&cfg).search("rust", &SearchParams::new()).await.unwrap_err();
        assert!(err.to_string().contains("missing api_key"));
    }

    #[tokio::test]
    async fn test_mock_results() {
        let mut cfg = ProviderConfig::new("google-mock", "google");
        cfg.mock = true;
        let provider = google(&cfg);

        let default = provider.search("cats", &SearchParams::new()).await.unwrap();
        assert_eq!(default.len(), 3);

        let capped = provider
            .search("cats", &SearchParams::new().with("num", 50))
            .await
            .unwrap();
        assert_eq!(capped.len(), 10);
        assert_eq!(capped[9].position, 10);
        assert!(capped.iter().all(|r| r.source == "google" && !r.is_from_cache));
    }

    #[tokio::test]
    async fn test_search_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "rust"))
            .and(query_param("key", "test_api_key"))
            .and(query_param("num", "5"))
            .and(query_param_is_missing("start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "title": "Title 1",
                        "link": "https://example.com/1",
                        "snippet": "Snippet 1",
                        "htmlSnippet": "<b>Snippet 1</b>",
                        "displayLink": "example.com",
                        "formattedUrl": "https://example.com/1"
                    },
                    {
                        "title": "Title 2",
                        "link": "https://example.com/2",
                        "snippet": "Snippet 2"
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = google(&config(Some(server.uri())));
        let results = provider
            .search("rust", &SearchParams::new().with("num", 5))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Title 1");
        assert_eq!(results[0].position, 1);
        assert_eq!(results[0].additional_info["displayLink"], "example.com");
        assert_eq!(results[1].position, 2);
        assert!(results[1].additional_info.is_empty());
        assert!(results.iter().all(|r| r.source == "google"));
    }

    #[tokio::test]
    async fn test_search_no_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "searchInformation": {"totalResults": "0"}
            })))
            .mount(&server)
            .await;

        let provider = google(&config(Some(server.uri())));
        let results = provider.search("zzzz", &SearchParams::new()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = google(&config(Some(server.uri())));
        let err = provider.search("rust", &SearchParams::new()).await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_invalid_base_url() {
        let cfg = config(Some("not a url".to_string()));
        assert!(Google::new(&cfg, HttpClient::new().unwrap()).is_err());
    }
}
