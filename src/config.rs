use crate::mission::DEFAULT_MAX_ROUNDS;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
const DEFAULT_MISTRAL_MODEL: &str = "mistral-large-latest";

/// Which chat-completions backend the orchestrator talks to.
///
/// Both speak the same OpenAI-style request/response shape; they differ in
/// how the endpoint is addressed and how the key is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Azure OpenAI deployment. Full deployment URL, `api-key` header.
    AzureOpenAi,
    /// Mistral platform. Fixed URL, bearer token, model named in the body.
    Mistral,
}

impl LlmProvider {
    /// `LLM_PROVIDER` wins when set; otherwise `USE_AZURE_OPENAI=false`
    /// selects Mistral and anything else keeps Azure as the default.
    pub fn from_env() -> Self {
        match env::var("LLM_PROVIDER")
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_str()
        {
            "mistral" | "mistralai" => Self::Mistral,
            "azure" | "azure-openai" | "openai" => Self::AzureOpenAi,
            _ => {
                if env::var("USE_AZURE_OPENAI").map(|v| v.trim() == "false").unwrap_or(false) {
                    Self::Mistral
                } else {
                    Self::AzureOpenAi
                }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AzureOpenAi => "Azure OpenAI",
            Self::Mistral => "MistralAI",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// Azure deployment URL (chat completions, api-version included).
    pub azure_endpoint: Option<String>,
    pub azure_api_key: Option<String>,
    pub mistral_api_url: String,
    pub mistral_api_key: Option<String>,
    pub mistral_model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub llm: LlmConfig,
    /// Base URL of the drone command server; commands go to `{url}/cmd`.
    pub drone_api_url: String,
    pub drone_timeout: Duration,
    /// Optional JSON file of extra sites merged over the built-in table.
    pub sites_path: Option<PathBuf>,
    /// Upper bound on tool-calling rounds per chat turn.
    pub max_tool_rounds: usize,
    /// Pause after each successful flight command.
    pub command_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Credentials are not checked here: a missing key only becomes an error
    /// when the LLM client is built, so the rest of the config stays usable
    /// in tests and tooling.
    pub fn from_env() -> anyhow::Result<Self> {
        let llm = LlmConfig {
            provider: LlmProvider::from_env(),
            azure_endpoint: non_empty_var("AZURE_OPENAI_ENDPOINT"),
            azure_api_key: non_empty_var("AZURE_OPENAI_API_KEY"),
            mistral_api_url: non_empty_var("MISTRAL_API_URL")
                .unwrap_or_else(|| DEFAULT_MISTRAL_API_URL.to_string()),
            mistral_api_key: non_empty_var("MISTRAL_API_KEY"),
            mistral_model: non_empty_var("MISTRAL_MODEL")
                .unwrap_or_else(|| DEFAULT_MISTRAL_MODEL.to_string()),
            timeout: Duration::from_secs(
                env::var("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()?,
            ),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            llm,
            drone_api_url: clean_url(
                &env::var("DRONE_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string()),
            ),
            drone_timeout: Duration::from_secs(
                env::var("DRONE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            ),
            sites_path: non_empty_var("SITES_PATH").map(PathBuf::from),
            max_tool_rounds: env::var("MAX_TOOL_ROUNDS")
                .unwrap_or_else(|_| DEFAULT_MAX_ROUNDS.to_string())
                .parse()?,
            command_delay: Duration::from_millis(
                env::var("COMMAND_DELAY_MS")
                    .unwrap_or_else(|_| "2000".to_string())
                    .parse()?,
            ),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Strip whitespace, wrapping quotes and a trailing slash from a URL taken
/// from the environment (`.env` files often keep the quotes).
pub fn clean_url(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_url_strips_quotes_and_slash() {
        assert_eq!(clean_url("  \"http://drone:8000/\" "), "http://drone:8000");
        assert_eq!(clean_url("'http://localhost:8000'"), "http://localhost:8000");
        assert_eq!(clean_url("http://localhost:8000"), "http://localhost:8000");
    }

    #[test]
    fn test_round_limit_defaults_to_orchestrator_default() {
        if env::var("MAX_TOOL_ROUNDS").is_ok() {
            return;
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.max_tool_rounds, DEFAULT_MAX_ROUNDS);
    }

    #[test]
    fn test_provider_labels() {
        assert_eq!(LlmProvider::AzureOpenAi.label(), "Azure OpenAI");
        assert_eq!(LlmProvider::Mistral.label(), "MistralAI");
    }
}
