//! Hand-written doubles for the model and search provider.

use std::{net::TcpListener, sync::Mutex};

use async_trait::async_trait;

use crate::{
    domain::{prompts::TaskPrompt, search_result::SearchResult},
    services::{LanguageModel, LlmError, SearchError, WebSearcher},
};

pub const VALID_REPORT: &str = "# Potential Fintech Clients in Kenya\n\n\
| Company Name | Industry | Location | Website |\n\
|---|---|---|---|\n\
| M-Kopa | Fintech | Nairobi | https://m-kopa.com |\n";

/// Answers each prompted task by recognising its system prompt. The query task
/// runs one search through the tool it was handed.
pub struct ScriptedModel {
    report: String,
    drafted_queries: Vec<String>,
    prompts: Mutex<Vec<TaskPrompt>>,
}

impl ScriptedModel {
    pub fn new(report: &str) -> Self {
        ScriptedModel {
            report: report.to_string(),
            drafted_queries: vec![],
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn with_drafted_queries(mut self, queries: Vec<String>) -> Self {
        self.drafted_queries = queries;
        self
    }

    pub fn prompts(&self) -> Vec<TaskPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn run_task(
        &self,
        prompt: &TaskPrompt,
        tool: Option<&dyn WebSearcher>,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.clone());

        if prompt.system.contains("finding potential consulting clients") {
            let mut searches = 0;
            if let Some(searcher) = tool {
                searcher.search("fintech companies Kenya").await?;
                searches += 1;
            }
            Ok(format!("searched {} time(s)", searches))
        } else if prompt.system.contains("analyzing and filtering") {
            Ok("filtered leads".to_string())
        } else {
            Ok(self.report.clone())
        }
    }

    async fn generate_search_queries(&self, _prompt: &str) -> Result<Vec<String>, LlmError> {
        Ok(self.drafted_queries.clone())
    }
}

/// Returns one result per configured link for every query, and remembers the queries.
pub struct FakeSearcher {
    links: Vec<String>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeSearcher {
    pub fn with_links(links: Vec<String>) -> Self {
        FakeSearcher {
            links,
            fail: false,
            queries: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        FakeSearcher {
            links: vec![],
            fail: true,
            queries: Mutex::new(vec![]),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for FakeSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());

        if self.fail {
            return Err(SearchError::Status {
                status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                body: "usage limit exceeded".to_string(),
            });
        }

        Ok(self
            .links
            .iter()
            .map(|link| SearchResult {
                title: format!("Result for {}", query),
                link: link.clone(),
                snippet: "A fintech company".to_string(),
            })
            .collect())
    }
}

/// A local url nobody listens on, so requests to it fail to connect.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/down", port)
}
