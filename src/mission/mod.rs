//! Mission core: the tool-calling loop, the flight-plan compiler and the plan
//! runner.

pub mod compiler;
pub mod orchestrator;
pub mod record;
pub mod runner;
pub mod stage;

pub use compiler::{compile_flight_plan, CommandStatus, FlightCommand};
pub use orchestrator::{ConversationOrchestrator, TurnOutcome, DEFAULT_MAX_ROUNDS};
pub use record::{ToolCallRecord, ToolOutcome};
pub use runner::{PlanProgress, PlanRunner};
pub use stage::MissionStage;
