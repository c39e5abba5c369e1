use crate::error::{AppError, Result};
use crate::mission::{compile_flight_plan, FlightCommand, PlanProgress, ToolCallRecord};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub tool_calls: Vec<ToolCallRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResponse {
    pub flight_plan: Vec<FlightCommand>,
}

/// POST /flight-plan - Recompile a plan from recorded tool calls.
pub async fn compile_handler(Json(request): Json<CompileRequest>) -> Json<CompileResponse> {
    let flight_plan = compile_flight_plan(&request.tool_calls);
    tracing::debug!(
        tool_calls = request.tool_calls.len(),
        commands = flight_plan.len(),
        "Flight plan recompiled"
    );
    Json(CompileResponse { flight_plan })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub flight_plan: Vec<FlightCommand>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub accepted: bool,
}

/// POST /flight-plan/execute - Start a plan in the background.
///
/// 202 when the runner took the plan, 200 with `accepted: false` when another
/// plan is still running.
pub async fn execute_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExecuteRequest>,
) -> Result<(StatusCode, Json<ExecuteResponse>)> {
    if request.flight_plan.is_empty() {
        return Err(AppError::ValidationError(
            "Flight plan cannot be empty".to_string(),
        ));
    }
    if let Some(bad) = request
        .flight_plan
        .iter()
        .find(|c| !(c.parameters.is_object() || c.parameters.is_null()))
    {
        return Err(AppError::ValidationError(format!(
            "Command {} parameters must be an object",
            bad.id
        )));
    }

    let accepted = state.runner.start(request.flight_plan);
    let status = if accepted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ExecuteResponse { accepted })))
}

/// GET /flight-plan/status - Per-command statuses of the latest run.
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<PlanProgress> {
    Json(state.runner.progress().await)
}
