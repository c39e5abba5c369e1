use crate::error::{AppError, Result};
use crate::llm::ChatMessage;
use crate::mission::{compile_flight_plan, FlightCommand, ToolCallRecord};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PLAN_READY_FALLBACK: &str = "Flight plan generated. Please review before execution.";
const EMPTY_REPLY_FALLBACK: &str = "No response generated";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<IncomingMessage>,
    /// Start the compiled plan right away.
    #[serde(default)]
    pub execute: bool,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: AssistantReply,
    #[serde(flatten)]
    pub mission: Option<MissionReport>,
}

#[derive(Debug, Serialize)]
pub struct AssistantReply {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionReport {
    pub tool_calls: Vec<ToolCallRecord>,
    /// `null` when the first tool round came without text.
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_plan: Option<Vec<FlightCommand>>,
    /// Present only when `execute` was requested with a non-empty plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_started: Option<bool>,
}

/// POST /chat - One conversational turn.
///
/// # Flow
/// 1. Validate and convert the client history
/// 2. Run the tool-calling loop
/// 3. Compile the flight plan from the recorded tool calls
/// 4. Optionally hand the plan to the runner
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let conversation = to_conversation(&request.messages)?;
    metrics::counter!("chat_turns_total").increment(1);

    let outcome = state.orchestrator.run_turn(conversation).await?;

    if outcome.tool_calls.is_empty() {
        return Ok(Json(ChatResponse {
            message: AssistantReply {
                role: "assistant",
                content: outcome
                    .content
                    .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string()),
            },
            mission: None,
        }));
    }

    let plan = compile_flight_plan(&outcome.tool_calls);
    metrics::histogram!("flight_plan_commands").record(plan.len() as f64);
    tracing::info!(
        tool_calls = outcome.tool_calls.len(),
        commands = plan.len(),
        "Flight plan compiled"
    );

    let execution_started = if request.execute && !plan.is_empty() {
        Some(state.runner.start(plan.clone()))
    } else {
        None
    };

    let content = outcome
        .content
        .unwrap_or_else(|| PLAN_READY_FALLBACK.to_string());

    Ok(Json(ChatResponse {
        message: AssistantReply {
            role: "assistant",
            content,
        },
        mission: Some(MissionReport {
            tool_calls: outcome.tool_calls,
            reasoning: outcome.reasoning,
            flight_plan: (!plan.is_empty()).then_some(plan),
            execution_started,
        }),
    }))
}

/// Client history may only carry user and assistant text.
fn to_conversation(messages: &[IncomingMessage]) -> Result<Vec<ChatMessage>> {
    if messages.is_empty() {
        return Err(AppError::ValidationError(
            "Messages cannot be empty".to_string(),
        ));
    }

    messages
        .iter()
        .enumerate()
        .map(|(i, m)| match m.role.as_str() {
            "user" => Ok(ChatMessage::user(&m.content)),
            "assistant" => Ok(ChatMessage::assistant(&m.content)),
            other => Err(AppError::ValidationError(format!(
                "Unsupported role '{}' at messages[{}]",
                other, i
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    fn incoming(role: &str, content: &str) -> IncomingMessage {
        IncomingMessage {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_conversation_keeps_order_and_roles() {
        let messages = vec![
            incoming("user", "Inspect Cattenom"),
            incoming("assistant", "Done"),
            incoming("user", "Now Gravelines"),
        ];

        let conversation = to_conversation(&messages).unwrap();
        let roles: Vec<Role> = conversation.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(conversation[2].text_content(), Some("Now Gravelines"));
    }

    #[test]
    fn test_empty_conversation_rejected() {
        let err = to_conversation(&[]).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_tool_role_rejected() {
        let err = to_conversation(&[incoming("tool", "{}")]).unwrap_err();
        assert_eq!(err.message(), "Unsupported role 'tool' at messages[0]");
    }

    #[test]
    fn test_plain_reply_has_no_mission_keys() {
        let response = ChatResponse {
            message: AssistantReply {
                role: "assistant",
                content: "Hello".to_string(),
            },
            mission: None,
        };

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"message": {"role": "assistant", "content": "Hello"}})
        );
    }
}
