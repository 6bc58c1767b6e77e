use std::time::Duration;

use reqwest::{header::USER_AGENT, Client};
use scraper::Html;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use url::Url;

use crate::{configuration::FetcherSettings, domain::search_result::SearchResult};

const DOCUMENT_EXTENSIONS: [&str; 5] = [".pdf", ".doc", ".docx", ".ppt", ".pptx"];
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];
const MAX_REQUESTS_PER_SECOND: u32 = 1_000;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub struct ContentFetcher {
    client: Client,
    user_agent: String,
    interval: Duration,
}

impl ContentFetcher {
    pub fn new(settings: &FetcherSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_default();

        ContentFetcher {
            client,
            user_agent: settings.user_agent.clone(),
            interval: Duration::from_secs(1)
                / settings
                    .requests_per_second
                    .clamp(1, MAX_REQUESTS_PER_SECOND),
        }
    }

    /// Page text for every url, or nothing at all if any single request fails to complete.
    /// Error statuses still count as pages, their body is used as is.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<String> {
        if urls.is_empty() {
            log::warn!("No valid URLs found in search results");
            return vec![];
        }

        log::info!("Processing {} URLs...", urls.len());

        match self.try_fetch_all(urls).await {
            Ok(pages) => pages,
            Err(e) => {
                log::error!("Error loading web content: {}", e);
                vec![]
            }
        }
    }

    async fn try_fetch_all(&self, urls: &[String]) -> Result<Vec<String>, FetchError> {
        let mut ticker = tokio::time::interval(self.interval);
        // A slow page must not let the following requests catch up in a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut pages = Vec::with_capacity(urls.len());

        for url in urls {
            ticker.tick().await;

            let body = self
                .fetch(url)
                .await
                .map_err(|source| FetchError::Request {
                    url: url.clone(),
                    source,
                })?;
            pages.push(extract_page_text(&body));
        }

        Ok(pages)
    }

    async fn fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .text()
            .await
    }
}

/// Links worth fetching: http(s) only, and no office documents.
pub fn select_fetchable_urls(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| r.link.trim())
        .filter(|link| is_fetchable_url(link))
        .map(|link| link.to_string())
        .collect()
}

fn is_fetchable_url(link: &str) -> bool {
    let parsed_url = match Url::parse(link) {
        Ok(u) => u,
        Err(_) => return false,
    };

    match parsed_url.scheme() {
        "http" | "https" => {}
        _ => return false,
    }

    let path = parsed_url.path().to_lowercase();
    let full = link.to_lowercase();

    !DOCUMENT_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(ext) || full.ends_with(ext))
}

/// Visible text of an html page with whitespace collapsed.
pub fn extract_page_text(html_content: &str) -> String {
    let html_document = Html::parse_document(html_content);

    let words: Vec<&str> = html_document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent_name = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name()));

            match parent_name {
                Some(name) if SKIPPED_ELEMENTS.contains(&name) => None,
                _ => Some(&**text),
            }
        })
        .flat_map(str::split_whitespace)
        .collect();

    words.join(" ")
}
