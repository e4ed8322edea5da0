//! In-memory provider for tests

use super::traits::{Provider, ProviderAbout};
use crate::results::ResultItem;
use crate::search::SearchParams;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Provider returning canned results or a canned failure, counting calls
pub(crate) struct StubProvider {
    name: String,
    results: Vec<ResultItem>,
    failure: Option<String>,
    delay: Option<Duration>,
    available: bool,
    calls: AtomicUsize,
    last_params: Mutex<Option<SearchParams>>,
}

impl StubProvider {
    /// Provider returning `count` results
    pub(crate) fn returning(name: &str, count: u32) -> Self {
        let results = (1..=count)
            .map(|i| {
                ResultItem::new(
                    format!("{} result {}", name, i),
                    format!("https://{}.example.com/{}", name, i),
                    format!("Snippet {} from {}", i, name),
                    name,
                    i,
                )
            })
            .collect();

        Self {
            name: name.to_string(),
            results,
            failure: None,
            delay: None,
            available: true,
            calls: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        }
    }

    /// Provider whose every search fails with `message`
    pub(crate) fn failing(name: &str, message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::returning(name, 0)
        }
    }

    /// Sleep before answering
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report the provider as unavailable
    pub(crate) fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Number of searches run
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Parameters of the last search
    pub(crate) fn last_params(&self) -> Option<SearchParams> {
        self.last_params.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn about(&self) -> ProviderAbout {
        ProviderAbout::new()
            .description("Stub provider")
            .website("https://stub.example.com")
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn search(&self, _query: &str, params: &SearchParams) -> anyhow::Result<Vec<ResultItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(self.results.clone()),
        }
    }
}
