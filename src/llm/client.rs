use crate::config::{LlmConfig, LlmProvider};
use crate::error::{AppError, Result};
use crate::llm::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ToolChoice};
use async_trait::async_trait;
use serde_json::Value;

/// Capability to run one chat completion with tool declarations.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Returns `choices[0].message` of the completion.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
        tool_choice: &ToolChoice,
    ) -> Result<ChatMessage>;
}

#[derive(Debug, Clone)]
enum Backend {
    AzureOpenAi {
        endpoint: String,
        api_key: String,
    },
    Mistral {
        url: String,
        api_key: String,
        model: String,
    },
}

/// Chat-completions client for Azure OpenAI or Mistral.
pub struct HttpCompletionClient {
    backend: Backend,
    client: reqwest::Client,
}

impl HttpCompletionClient {
    /// Build the client for the configured provider.
    ///
    /// # Errors
    /// `ConfigurationError` when the provider's endpoint or key is missing.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let backend = match config.provider {
            LlmProvider::AzureOpenAi => Backend::AzureOpenAi {
                endpoint: config.azure_endpoint.clone().ok_or_else(|| {
                    AppError::ConfigurationError(
                        "AZURE_OPENAI_ENDPOINT not configured".to_string(),
                    )
                })?,
                api_key: config.azure_api_key.clone().ok_or_else(|| {
                    AppError::ConfigurationError("AZURE_OPENAI_API_KEY not configured".to_string())
                })?,
            },
            LlmProvider::Mistral => Backend::Mistral {
                url: config.mistral_api_url.clone(),
                api_key: config.mistral_api_key.clone().ok_or_else(|| {
                    AppError::ConfigurationError("MISTRAL_API_KEY not configured".to_string())
                })?,
                model: config.mistral_model.clone(),
            },
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AppError::ConfigurationError(format!("Failed to build LLM HTTP client: {}", e))
            })?;

        Ok(Self { backend, client })
    }

    pub fn provider(&self) -> LlmProvider {
        match self.backend {
            Backend::AzureOpenAi { .. } => LlmProvider::AzureOpenAi,
            Backend::Mistral { .. } => LlmProvider::Mistral,
        }
    }
}

#[async_trait]
impl ChatCompletion for HttpCompletionClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
        tool_choice: &ToolChoice,
    ) -> Result<ChatMessage> {
        let provider = self.provider();
        let has_tools = !tools.is_empty();
        let (model, builder) = match &self.backend {
            Backend::AzureOpenAi { endpoint, api_key } => {
                (None, self.client.post(endpoint).header("api-key", api_key))
            }
            Backend::Mistral {
                url,
                api_key,
                model,
            } => (Some(model.as_str()), self.client.post(url).bearer_auth(api_key)),
        };

        let body = ChatCompletionRequest {
            model,
            messages,
            tools: has_tools.then_some(tools),
            tool_choice: has_tools.then_some(tool_choice),
        };

        tracing::debug!(
            provider = provider.label(),
            tool_choice = %tool_choice,
            messages = messages.len(),
            tools = tools.len(),
            "Calling chat completions"
        );
        metrics::counter!("llm_requests_total", "provider" => provider.label()).increment(1);

        let response = builder.json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError(format!(
                "{} API error: {} - {}",
                provider.label(),
                status.as_u16(),
                text
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::UpstreamError(format!(
                "{} returned an unreadable completion: {}",
                provider.label(),
                e
            ))
        })?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                AppError::UpstreamError(format!("{} returned no choices", provider.label()))
            })?;

        tracing::debug!(
            provider = provider.label(),
            tool_calls = message.tool_calls().len(),
            has_content = message.text_content().is_some(),
            "Completion received"
        );

        Ok(message)
    }
}
