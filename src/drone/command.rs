use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions understood by the drone command server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightAction {
    Takeoff,
    Goto,
    Circle,
    Capture,
    Rth,
    Land,
    Status,
}

impl FlightAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightAction::Takeoff => "takeoff",
            FlightAction::Goto => "goto",
            FlightAction::Circle => "circle",
            FlightAction::Capture => "capture",
            FlightAction::Rth => "rth",
            FlightAction::Land => "land",
            FlightAction::Status => "status",
        }
    }
}

impl std::fmt::Display for FlightAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /cmd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneCommand {
    pub id: String,
    pub action: FlightAction,
    #[serde(default)]
    pub parameters: Value,
}

impl DroneCommand {
    /// Command with a freshly generated `cmd_<uuid>` id.
    pub fn new(action: FlightAction, parameters: Value) -> Self {
        Self {
            id: format!("cmd_{}", uuid::Uuid::new_v4().simple()),
            action,
            parameters,
        }
    }

    pub fn with_id(id: impl Into<String>, action: FlightAction, parameters: Value) -> Self {
        Self {
            id: id.into(),
            action,
            parameters,
        }
    }
}

/// Capability to execute one command on the drone.
///
/// Implementations return the endpoint's JSON response verbatim, and map
/// transport failures, timeouts and non-2xx replies to `UpstreamError`.
#[async_trait]
pub trait DroneEndpoint: Send + Sync {
    async fn execute(&self, command: &DroneCommand) -> Result<Value>;
}
