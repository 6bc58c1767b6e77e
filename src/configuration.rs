use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::services::SearchStrategy;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api_keys: ApiKeys,
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub fetcher: FetcherSettings,
    pub orchestration: OrchestrationSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub leads_dir: String,
}

#[derive(Deserialize, Clone)]
pub struct ApiKeys {
    pub openai: String,
    pub tavily: String,
}

#[derive(Deserialize, Clone)]
pub struct LlmSettings {
    pub model: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub temperature: f32,
    /// Upper bound on tool-calling round trips inside one prompted task.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_tool_rounds: u8,
    pub max_tokens: Option<u32>,
}

#[derive(Deserialize, Clone)]
pub struct SearchSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_results: u8,
    pub search_depth: String,
    pub include_answer: bool,
    pub include_raw_content: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct FetcherSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub requests_per_second: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Deserialize, Clone)]
pub struct OrchestrationSettings {
    pub strategy: SearchStrategy,
    pub validate_report: bool,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // APP_API_KEYS__OPENAI=sk-... sets `api_keys.openai`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Debug, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
