use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{configuration::SearchSettings, domain::search_result::SearchResult};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Search provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

pub struct TavilySearcher {
    client: Client,
    api_key: String,
    url: String,
    max_results: u8,
    search_depth: String,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Serialize)]
struct TavilyQuery<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u8,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearcher {
    pub fn new(api_key: String, settings: &SearchSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_default();

        TavilySearcher {
            client,
            api_key,
            url: format!("{}/search", settings.base_url.trim_end_matches('/')),
            max_results: settings.max_results,
            search_depth: settings.search_depth.clone(),
            include_answer: settings.include_answer,
            include_raw_content: settings.include_raw_content,
        }
    }
}

#[async_trait]
impl WebSearcher for TavilySearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        log::info!("Searching: {}", query);

        let res = self
            .client
            .post(&self.url)
            .json(&TavilyQuery {
                api_key: &self.api_key,
                query,
                max_results: self.max_results,
                search_depth: &self.search_depth,
                include_answer: self.include_answer,
                include_raw_content: self.include_raw_content,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            log::error!("Search provider returned {} on query: {}", status, query);
            return Err(SearchError::Status { status, body });
        }

        let response = res.json::<TavilyResponse>().await?;
        let results: Vec<SearchResult> = response
            .results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title,
                link: r.url,
                snippet: r.content,
            })
            .collect();

        log::info!("Found {} results on query: {}", results.len(), query);

        Ok(results)
    }
}

/// Remembers every result returned through it during one run.
pub struct RecordingSearcher<'a> {
    inner: &'a dyn WebSearcher,
    seen: Mutex<Vec<SearchResult>>,
}

impl<'a> RecordingSearcher<'a> {
    pub fn new(inner: &'a dyn WebSearcher) -> Self {
        RecordingSearcher {
            inner,
            seen: Mutex::new(vec![]),
        }
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        self.seen.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WebSearcher for RecordingSearcher<'_> {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let results = self.inner.search(query).await?;
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(results.iter().cloned());

        Ok(results)
    }
}
