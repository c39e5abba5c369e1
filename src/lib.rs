//! Sortie - Conversational drone-mission service
//!
//! An LLM drives a set of mission tools (site lookup, baseline state, recon
//! planning, direct flight commands); the recorded tool calls are compiled
//! into an ordered flight plan that a runner executes against the drone
//! endpoint.

pub mod config;
pub mod drone;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod mission;
pub mod state;
pub mod tools;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

// Re-export key types for convenience
pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::{chat_handler, health_handler, ready_handler};
pub use mission::{compile_flight_plan, ConversationOrchestrator, FlightCommand, PlanRunner};
pub use state::AppState;

/// All API routes bound to `state`. Middleware and `/metrics` are added by
/// the binary.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat_handler))
        .route("/flight-plan", post(handlers::compile_handler))
        .route("/flight-plan/execute", post(handlers::execute_handler))
        .route("/flight-plan/status", get(handlers::status_handler))
        .route("/tools", get(handlers::tools_handler))
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        .with_state(state)
}
