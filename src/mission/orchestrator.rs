//! Multi-round tool-calling loop for one chat turn.
//!
//! # Flow
//! 1. Ask the LLM (tools on `auto`) with the mission instructions + history
//! 2. Run every requested tool concurrently, append the assistant tool-call
//!    message and one `tool` message per call
//! 3. If the mission is [`MissionStage::ReadyToPlan`] and rounds remain,
//!    re-prompt with a planning directive and go back to 2
//! 4. Ask once more with tools on `none` for the natural-language answer

use crate::error::Result;
use crate::llm::{ChatCompletion, ChatMessage, ToolCall, ToolChoice};
use crate::mission::record::{ToolCallRecord, ToolOutcome};
use crate::mission::stage::MissionStage;
use crate::tools::{parse_raw_arguments, ToolCatalog, ToolExecutor};
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_MAX_ROUNDS: usize = 5;

const CALL_ID_LEN: usize = 9;

const MISSION_INSTRUCTIONS: &str = "You are an expert assistant controlling a drone. \
When the user asks for a mission (inspection, reconnaissance, ...), you MUST automatically:\n\
1. Get the GPS coordinates of every site mentioned with get_site_coordinates\n\
2. Get the drone's baseline state with get_baseline_state (home point, cruise altitude, speed)\n\
3. Check the no-fly zones with get_no_fly_zones\n\
4. For EACH site, plan a mission with plan_recon_mission (default radius: 200 m, altitude: the cruise altitude from get_baseline_state)\n\n\
Be PROACTIVE and call all of these tools without asking for confirmation. \
Never ask \"do you want me to do X?\", just do it. \
If the user asks to inspect several sites, plan a mission for EACH site.";

const PLANNING_DIRECTIVE: &str = "You have the coordinates and the baseline state. \
You MUST now call plan_recon_mission for EACH site whose coordinates you have. \
Use a 200 m radius by default and the cruise altitude you retrieved.";

const SUMMARY_DIRECTIVE: &str = "You are an assistant controlling a drone. \
After using tools, always give the user a clear, detailed answer explaining what was done. \
A flight plan will be generated automatically from the gathered data.";

/// What one turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final natural-language answer, `None` when the model returned nothing.
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Free text that accompanied the first round of tool calls.
    pub reasoning: Option<String>,
    /// Number of tool-calling rounds executed.
    pub rounds: usize,
}

pub struct ConversationOrchestrator {
    llm: Arc<dyn ChatCompletion>,
    executor: Arc<ToolExecutor>,
    catalog: Arc<ToolCatalog>,
    max_rounds: usize,
}

impl ConversationOrchestrator {
    pub fn new(
        llm: Arc<dyn ChatCompletion>,
        executor: Arc<ToolExecutor>,
        catalog: Arc<ToolCatalog>,
        max_rounds: usize,
    ) -> Self {
        Self {
            llm,
            executor,
            catalog,
            max_rounds: max_rounds.max(1),
        }
    }

    /// Run one user turn over `conversation` (prior turns + the new user
    /// message, without the mission instructions).
    ///
    /// # Errors
    /// Any failed LLM call aborts the turn. Tool failures do not; they are
    /// recorded as `{error}` results.
    pub async fn run_turn(&self, conversation: Vec<ChatMessage>) -> Result<TurnOutcome> {
        let started = Instant::now();
        let mut history = conversation;
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut reasoning = None;
        let mut rounds = 0;

        let mut reply = self.ask(&history, None, ToolChoice::Auto).await?;

        while reply.has_tool_calls() {
            rounds += 1;
            if rounds == 1 {
                reasoning = reply.text_content().map(str::to_string);
            }

            let calls = assign_unique_ids(reply.tool_calls(), &mut seen_ids);
            let round_records = self.execute_round(&calls).await;

            history.push(ChatMessage::assistant_tool_calls(
                reply.content.clone(),
                calls.iter().map(ToolCall::with_string_arguments).collect(),
            ));
            for record in &round_records {
                history.push(ChatMessage::tool_result(&record.id, record.result_message()));
            }
            records.extend(round_records);

            let stage = MissionStage::evaluate(&records);
            tracing::info!(
                round = rounds,
                max_rounds = self.max_rounds,
                tool_calls = calls.len(),
                total_tool_calls = records.len(),
                stage = stage.as_str(),
                "Tool round completed"
            );

            if !stage.needs_planning_round() || rounds >= self.max_rounds {
                break;
            }

            tracing::info!(round = rounds + 1, "Requesting recon plans for resolved sites");
            reply = self
                .ask(&history, Some(PLANNING_DIRECTIVE), ToolChoice::Auto)
                .await?;
        }

        let final_reply = self
            .ask(&history, Some(SUMMARY_DIRECTIVE), ToolChoice::None)
            .await?;

        metrics::histogram!("orchestrator_rounds").record(rounds as f64);
        tracing::info!(
            rounds,
            tool_calls = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat turn completed"
        );

        Ok(TurnOutcome {
            content: final_reply.text_content().map(str::to_string),
            tool_calls: records,
            reasoning,
            rounds,
        })
    }

    /// One LLM request: instructions, then history, then an optional
    /// directive that is not kept in the history.
    async fn ask(
        &self,
        history: &[ChatMessage],
        directive: Option<&str>,
        tool_choice: ToolChoice,
    ) -> Result<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(MISSION_INSTRUCTIONS));
        messages.extend_from_slice(history);
        if let Some(text) = directive {
            messages.push(ChatMessage::system(text));
        }

        self.llm
            .complete(&messages, self.catalog.llm_tools(), &tool_choice)
            .await
    }

    /// Execute all calls of a round concurrently; records keep call order.
    async fn execute_round(&self, calls: &[ToolCall]) -> Vec<ToolCallRecord> {
        join_all(calls.iter().map(|call| self.execute_call(call))).await
    }

    async fn execute_call(&self, call: &ToolCall) -> ToolCallRecord {
        let name = call.function.name.as_str();
        let (arguments, outcome) = match parse_raw_arguments(&call.function.arguments) {
            Ok(arguments) => {
                let result = self.executor.execute(name, &arguments).await;
                (arguments, ToolOutcome::from_result(result))
            }
            Err(e) => (call.function.arguments.clone(), ToolOutcome::failure(&e)),
        };

        let status = if outcome.is_success() { "success" } else { "error" };
        match &outcome {
            ToolOutcome::Success(_) => {
                tracing::info!(id = %call.id, tool = name, arguments = %arguments, "Tool executed")
            }
            ToolOutcome::Failure { error } => {
                tracing::warn!(id = %call.id, tool = name, arguments = %arguments, error = %error, "Tool failed")
            }
        }
        metrics::counter!("tool_calls_total", "tool" => name.to_string(), "outcome" => status)
            .increment(1);

        ToolCallRecord::new(call.id.clone(), name, arguments, outcome)
    }
}

/// Copy `calls`, replacing blank or repeated ids so every record id in the
/// turn is unique and matches its `tool` message.
fn assign_unique_ids(calls: &[ToolCall], seen: &mut HashSet<String>) -> Vec<ToolCall> {
    calls
        .iter()
        .map(|call| {
            let mut call = call.clone();
            if call.id.trim().is_empty() || seen.contains(&call.id) {
                call.id = fresh_call_id(seen);
            }
            seen.insert(call.id.clone());
            call
        })
        .collect()
}

/// Nine alphanumeric characters, the only id shape Mistral accepts back.
fn fresh_call_id(seen: &HashSet<String>) -> String {
    loop {
        let id: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(CALL_ID_LEN)
            .collect();
        if !seen.contains(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FunctionCall;
    use serde_json::json;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: "land".to_string(),
                arguments: json!("{}"),
            },
        }
    }

    #[test]
    fn test_unique_ids_are_kept() {
        let mut seen = HashSet::new();
        let calls = assign_unique_ids(&[call("a"), call("b")], &mut seen);

        assert_eq!(calls[0].id, "a");
        assert_eq!(calls[1].id, "b");
    }

    #[test]
    fn test_blank_and_duplicate_ids_are_replaced() {
        let mut seen = HashSet::new();
        let first = assign_unique_ids(&[call("x")], &mut seen);
        let second = assign_unique_ids(&[call("x"), call(""), call("x")], &mut seen);

        assert_eq!(first[0].id, "x");
        let ids: HashSet<&str> = first
            .iter()
            .chain(second.iter())
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids.len(), 4);
        for replaced in &second {
            assert_eq!(replaced.id.len(), CALL_ID_LEN);
            assert!(replaced.id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
