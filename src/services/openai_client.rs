use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::{configuration::LlmSettings, domain::prompts::TaskPrompt};

use super::{SearchError, WebSearcher};

const WEB_SEARCH_TOOL: &str = "web_search";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenAI request failed: {0}")]
    Api(#[from] OpenAIError),
    #[error("No choices in Openai response")]
    NoChoices,
    #[error("No content in Openai response")]
    NoContent,
    #[error("Model kept calling tools after {0} rounds")]
    ToolRoundsExhausted(u8),
    #[error("Model called unknown tool `{0}`")]
    UnknownTool(String),
    #[error("Invalid tool call payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// A chat model able to run one prompted task, optionally with web search as a tool.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn run_task(
        &self,
        prompt: &TaskPrompt,
        tool: Option<&dyn WebSearcher>,
    ) -> Result<String, LlmError>;

    /// One search query per non-empty line of the model's answer.
    async fn generate_search_queries(&self, prompt: &str) -> Result<Vec<String>, LlmError>;
}

pub struct OpenaiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tool_rounds: u8,
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct WebSearchArgs {
    query: String,
}

impl OpenaiClient {
    pub fn new(api_key: String, settings: &LlmSettings) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self::with_config(config, settings)
    }

    pub fn with_config(config: OpenAIConfig, settings: &LlmSettings) -> Self {
        OpenaiClient {
            client: Client::with_config(config),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tool_rounds: settings.max_tool_rounds,
            max_tokens: settings.max_tokens,
        }
    }

    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<(Option<String>, Vec<ChatCompletionMessageToolCall>), LlmError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.as_str())
            .messages(messages.to_vec())
            .temperature(self.temperature);
        if !tools.is_empty() {
            args.tools(tools.to_vec());
        }
        if let Some(max_tokens) = self.max_tokens {
            args.max_tokens(max_tokens);
        }
        let request = args.build()?;

        let response = self.client.chat().create(request).await?;
        log::debug!("Response: {:?}", response);

        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::NoChoices)?
            .message;

        Ok((message.content, message.tool_calls.unwrap_or_default()))
    }

    async fn call_tool(
        &self,
        searcher: &dyn WebSearcher,
        call: &ChatCompletionMessageToolCall,
    ) -> Result<ChatCompletionRequestMessage, LlmError> {
        if call.function.name != WEB_SEARCH_TOOL {
            return Err(LlmError::UnknownTool(call.function.name.clone()));
        }

        let args: WebSearchArgs = serde_json::from_str(&call.function.arguments)?;
        let results = searcher.search(&args.query).await?;

        Ok(ChatCompletionRequestToolMessageArgs::default()
            .content(serde_json::to_string(&results)?)
            .tool_call_id(call.id.clone())
            .build()?
            .into())
    }
}

fn web_search_tool() -> Result<ChatCompletionTool, OpenAIError> {
    ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(
            FunctionObjectArgs::default()
                .name(WEB_SEARCH_TOOL)
                .description(
                    "Search the web. Returns a JSON list of results with title, link and snippet.",
                )
                .parameters(json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The search query",
                        },
                    },
                    "required": ["query"],
                }))
                .build()?,
        )
        .build()
}

#[async_trait]
impl LanguageModel for OpenaiClient {
    async fn run_task(
        &self,
        prompt: &TaskPrompt,
        tool: Option<&dyn WebSearcher>,
    ) -> Result<String, LlmError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.system.as_str())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.user.as_str())
                .build()?
                .into(),
        ];
        let tools = match tool {
            Some(_) => vec![web_search_tool()?],
            None => vec![],
        };

        let mut rounds = 0;
        loop {
            let (content, tool_calls) = self.complete(&messages, &tools).await?;

            let searcher = match (tool, tool_calls.is_empty()) {
                (Some(searcher), false) => searcher,
                _ => return content.ok_or(LlmError::NoContent),
            };

            if rounds >= self.max_tool_rounds {
                return Err(LlmError::ToolRoundsExhausted(self.max_tool_rounds));
            }
            rounds += 1;
            log::info!("Tool round {}: {} call(s)", rounds, tool_calls.len());

            let mut assistant = ChatCompletionRequestAssistantMessageArgs::default();
            assistant.tool_calls(tool_calls.clone());
            if let Some(content) = content {
                assistant.content(content);
            }
            messages.push(assistant.build()?.into());

            for call in tool_calls.iter() {
                messages.push(self.call_tool(searcher, call).await?);
            }
        }
    }

    async fn generate_search_queries(&self, prompt: &str) -> Result<Vec<String>, LlmError> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()];

        let (content, _) = self.complete(&messages, &[]).await?;
        let content = content.ok_or(LlmError::NoContent)?;

        let searches: Vec<String> = content
            .split('\n')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(searches)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use wiremock::{
        matchers::{body_string_contains, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::domain::search_result::SearchResult;

    struct CannedSearcher;

    #[async_trait]
    impl WebSearcher for CannedSearcher {
        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
            Ok(vec![SearchResult {
                title: "M-Kopa".to_string(),
                link: "https://m-kopa.com".to_string(),
                snippet: format!("matched {}", query),
            }])
        }
    }

    fn client(server: &MockServer, max_tool_rounds: u8) -> OpenaiClient {
        let config = OpenAIConfig::new()
            .with_api_key("sk-test")
            .with_api_base(server.uri());
        OpenaiClient::with_config(
            config,
            &LlmSettings {
                model: "gpt-4o-mini".to_string(),
                temperature: 0.0,
                max_tool_rounds,
                max_tokens: None,
            },
        )
    }

    fn completion(message: Value) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000u32,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": message,
                "finish_reason": "stop",
            }],
        })
    }

    fn search_call() -> Value {
        completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {
                    "name": "web_search",
                    "arguments": "{\"query\":\"fintech companies Kenya\"}",
                },
            }],
        }))
    }

    fn prompt() -> TaskPrompt {
        TaskPrompt {
            system: "system".to_string(),
            user: "user".to_string(),
        }
    }

    #[tokio::test]
    async fn run_task_executes_tool_calls_then_answers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("tool_call_id"))
            .and(body_string_contains("matched fintech companies Kenya"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": "M-Kopa looks promising.",
            }))))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_call()))
            .expect(1)
            .mount(&server)
            .await;

        let searcher = CannedSearcher;
        let output = client(&server, 3)
            .run_task(&prompt(), Some(&searcher))
            .await
            .unwrap();

        assert_eq!(output, "M-Kopa looks promising.");
    }

    #[tokio::test]
    async fn run_task_stops_after_max_tool_rounds() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_call()))
            .expect(3)
            .mount(&server)
            .await;

        let searcher = CannedSearcher;
        let err = client(&server, 2)
            .run_task(&prompt(), Some(&searcher))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::ToolRoundsExhausted(2)));
    }

    #[tokio::test]
    async fn generate_search_queries_one_per_line() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": "fintech startups Kenya\n\n  mobile money companies Nairobi  \nKenya payments expansion\n",
            }))))
            .mount(&server)
            .await;

        let queries = client(&server, 3)
            .generate_search_queries("give me queries")
            .await
            .unwrap();

        assert_eq!(
            queries,
            vec![
                "fintech startups Kenya",
                "mobile money companies Nairobi",
                "Kenya payments expansion"
            ]
        );
    }
}
