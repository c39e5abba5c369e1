use crate::state::AppState;
use crate::tools::catalog::ToolSummary;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct ToolsResponse {
    pub count: usize,
    pub tools: Vec<ToolSummary>,
}

/// GET /tools - Tool catalog offered to the LLM
pub async fn tools_handler(State(state): State<Arc<AppState>>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        count: state.catalog.len(),
        tools: state.catalog.summaries(),
    })
}
