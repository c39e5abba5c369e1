//! Test doubles shared by the integration suites.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use sortie::config::{LlmConfig, LlmProvider};
use sortie::drone::{DroneCommand, DroneEndpoint};
use sortie::llm::{ChatCompletion, ChatMessage, FunctionCall, ToolCall, ToolChoice};
use sortie::{AppError, Config, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Config that never touches the environment; no pause between commands.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        shutdown_timeout_secs: 0,
        llm: LlmConfig {
            provider: LlmProvider::Mistral,
            azure_endpoint: None,
            azure_api_key: None,
            mistral_api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            mistral_api_key: None,
            mistral_model: "test-model".to_string(),
            timeout: Duration::from_secs(1),
        },
        drone_api_url: "http://127.0.0.1:9".to_string(),
        drone_timeout: Duration::from_secs(1),
        sites_path: None,
        max_tool_rounds: 5,
        command_delay: Duration::ZERO,
    }
}

pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        kind: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: Value::String(arguments.to_string()),
        },
    }
}

pub fn calls(calls: Vec<ToolCall>) -> ChatMessage {
    ChatMessage::assistant_tool_calls(None, calls)
}

/// One LLM request as seen by the fake.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_count: usize,
    pub tool_choice: ToolChoice,
}

/// Replays queued replies in order. Once the queue is empty, answers with
/// `fallback`.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<ChatMessage>>,
    fallback: ChatMessage,
    pub seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<ChatMessage>, fallback: &str) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: ChatMessage::assistant(fallback),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedLlm {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
        tool_choice: &ToolChoice,
    ) -> Result<ChatMessage> {
        self.seen.lock().unwrap().push(SeenRequest {
            messages: messages.to_vec(),
            tool_count: tools.len(),
            tool_choice: tool_choice.clone(),
        });
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Keeps re-resolving a site and the baseline without ever planning, on
/// every request that allows tools.
#[derive(Default)]
pub struct LoopingLlm {
    pub seen: Mutex<Vec<ToolChoice>>,
}

#[async_trait]
impl ChatCompletion for LoopingLlm {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _tools: &[Value],
        tool_choice: &ToolChoice,
    ) -> Result<ChatMessage> {
        let mut seen = self.seen.lock().unwrap();
        seen.push(tool_choice.clone());
        if *tool_choice == ToolChoice::None {
            return Ok(ChatMessage::assistant("Stopped"));
        }
        let n = seen.len();
        Ok(calls(vec![
            tool_call(
                &format!("site_{}", n),
                "get_site_coordinates",
                json!({ "site_name": "Cattenom" }),
            ),
            tool_call(&format!("base_{}", n), "get_baseline_state", json!({})),
        ]))
    }
}

/// Every request fails like an unreachable provider.
pub struct FailingLlm;

#[async_trait]
impl ChatCompletion for FailingLlm {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _tools: &[Value],
        _tool_choice: &ToolChoice,
    ) -> Result<ChatMessage> {
        Err(AppError::UpstreamError(
            "MistralAI API error: 503 - unavailable".to_string(),
        ))
    }
}

/// Records commands; fails the ones whose id or action is listed.
#[derive(Default)]
pub struct RecordingDrone {
    pub fail_on: Vec<String>,
    pub delay: Duration,
    pub seen: Mutex<Vec<DroneCommand>>,
}

impl RecordingDrone {
    pub fn failing(ids_or_actions: &[&str]) -> Self {
        Self {
            fail_on: ids_or_actions.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn actions(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.action.as_str().to_string())
            .collect()
    }
}

#[async_trait]
impl DroneEndpoint for RecordingDrone {
    async fn execute(&self, command: &DroneCommand) -> Result<Value> {
        self.seen.lock().unwrap().push(command.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self
            .fail_on
            .iter()
            .any(|f| *f == command.id || f == command.action.as_str())
        {
            return Err(AppError::UpstreamError(
                "Drone endpoint returned HTTP 500: motor fault".to_string(),
            ));
        }
        Ok(json!({ "ok": true, "id": command.id }))
    }
}
