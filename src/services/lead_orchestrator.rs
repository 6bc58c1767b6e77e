use std::{io, sync::Arc};

use chrono::Datelike;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    configuration::Settings,
    domain::{
        lead_report::{validate_report, ReportError},
        lead_request::LeadRequest,
        prompts::{
            fallback_search_queries, filter_prompt, finalize_prompt, query_prompt,
            search_queries_prompt, FIXED_QUERY_COUNT,
        },
        search_result::SearchResult,
    },
};

use super::{
    select_fetchable_urls, ContentFetcher, LanguageModel, LlmError, OpenaiClient,
    RecordingSearcher, ReportStore, SearchError, TavilySearcher, WebSearcher,
};

/// Who decides how many searches the query step runs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// The model calls the search tool as often as it likes.
    Agent,
    /// The model drafts five queries up front and all five are executed.
    FixedFanOut,
}

#[derive(Debug, Error)]
pub enum LeadError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("Finalized report is malformed: {0}")]
    Report(#[from] ReportError),
    #[error("Failed to save lead report: {0}")]
    Persist(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadOutcome {
    pub filename: String,
    pub table: String,
}

pub struct LeadOrchestrator {
    llm: Arc<dyn LanguageModel>,
    searcher: Arc<dyn WebSearcher>,
    fetcher: ContentFetcher,
    store: ReportStore,
    strategy: SearchStrategy,
    validate_report: bool,
}

impl LeadOrchestrator {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        searcher: Arc<dyn WebSearcher>,
        fetcher: ContentFetcher,
        store: ReportStore,
    ) -> Self {
        LeadOrchestrator {
            llm,
            searcher,
            fetcher,
            store,
            strategy: SearchStrategy::Agent,
            validate_report: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let llm = OpenaiClient::new(settings.api_keys.openai.clone(), &settings.llm);
        let searcher = TavilySearcher::new(settings.api_keys.tavily.clone(), &settings.search);

        LeadOrchestrator::new(
            Arc::new(llm),
            Arc::new(searcher),
            ContentFetcher::new(&settings.fetcher),
            ReportStore::new(&settings.application.leads_dir),
        )
        .with_strategy(settings.orchestration.strategy)
        .with_report_validation(settings.orchestration.validate_report)
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_report_validation(mut self, validate_report: bool) -> Self {
        self.validate_report = validate_report;
        self
    }

    /// Query, fetch, filter, finalize, then persist. Nothing is written unless every step succeeds.
    pub async fn find_potential_clients(
        &self,
        request: &LeadRequest,
    ) -> Result<LeadOutcome, LeadError> {
        let current_year = chrono::Utc::now().year();

        log::info!(
            "QUERY: {} in {} ({:?})",
            request.industry,
            request.country,
            self.strategy
        );
        let (search_output, search_results) = match self.strategy {
            SearchStrategy::Agent => self.agent_search(request, current_year).await?,
            SearchStrategy::FixedFanOut => self.fixed_fan_out_search(request, current_year).await?,
        };

        log::info!("FETCH: {} search results", search_results.len());
        let urls = select_fetchable_urls(&search_results);
        let web_content = self.fetcher.fetch_all(&urls).await;
        let web_content_context = web_content.join("\n\n");

        log::info!("FILTER: {} pages of web content", web_content.len());
        let filtered = self
            .llm
            .run_task(
                &filter_prompt(request, current_year, &search_output, &web_content_context),
                Some(self.searcher.as_ref()),
            )
            .await?;

        log::info!("FINALIZE");
        let table = self
            .llm
            .run_task(
                &finalize_prompt(request, current_year, &filtered),
                Some(self.searcher.as_ref()),
            )
            .await?;

        if self.validate_report {
            validate_report(&table)?;
        }

        log::info!("PERSIST");
        let path = self
            .store
            .persist(&request.industry, &request.country, &table)?;

        Ok(LeadOutcome {
            filename: path.display().to_string(),
            table,
        })
    }

    async fn agent_search(
        &self,
        request: &LeadRequest,
        current_year: i32,
    ) -> Result<(String, Vec<SearchResult>), LeadError> {
        let recorder = RecordingSearcher::new(self.searcher.as_ref());
        let output = self
            .llm
            .run_task(&query_prompt(request, current_year), Some(&recorder))
            .await?;

        Ok((output, recorder.into_results()))
    }

    async fn fixed_fan_out_search(
        &self,
        request: &LeadRequest,
        current_year: i32,
    ) -> Result<(String, Vec<SearchResult>), LeadError> {
        let drafted = self
            .llm
            .generate_search_queries(&search_queries_prompt(request, current_year))
            .await?;
        let queries = complete_queries(drafted, fallback_search_queries(request, current_year));

        let mut output = String::new();
        let mut all_results = vec![];

        // Independent queries, still run one at a time.
        for query in queries.iter() {
            let results = self.searcher.search(query).await?;

            output.push_str(&format!("Query: {}\n", query));
            for r in results.iter() {
                output.push_str(&format!("- {} ({}): {}\n", r.title, r.link, r.snippet));
            }
            output.push('\n');

            all_results.extend(results);
        }

        Ok((output, all_results))
    }
}

/// Exactly `FIXED_QUERY_COUNT` distinct queries: the model's first, topped up from `fallback`.
fn complete_queries(drafted: Vec<String>, fallback: Vec<String>) -> Vec<String> {
    let mut queries: Vec<String> = vec![];

    for query in drafted.into_iter().chain(fallback) {
        if queries.len() == FIXED_QUERY_COUNT {
            break;
        }
        let query = strip_list_marker(&query).to_string();
        if !query.is_empty() && !queries.contains(&query) {
            queries.push(query);
        }
    }

    queries
}

/// "1. foo", "2) foo", "- foo" and "* foo" all become "foo".
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());

    let rest = match digits_end {
        0 => line
            .strip_prefix(|c: char| c == '-' || c == '*')
            .unwrap_or(line),
        _ => {
            let after_digits = &line[digits_end..];
            after_digits
                .strip_prefix(|c: char| c == '.' || c == ')')
                .unwrap_or(line)
        }
    };

    rest.trim()
}
