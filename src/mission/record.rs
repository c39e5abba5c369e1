use crate::error::AppError;
use crate::tools::ToolName;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Result of one tool call: the success payload, or `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutcome {
    Failure { error: String },
    Success(Value),
}

impl ToolOutcome {
    pub fn from_result(result: crate::error::Result<Value>) -> Self {
        match result {
            Ok(value) => ToolOutcome::Success(value),
            Err(e) => ToolOutcome::failure(&e),
        }
    }

    pub fn failure(err: &AppError) -> Self {
        ToolOutcome::Failure {
            error: err.message().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    pub fn to_value(&self) -> Value {
        match self {
            ToolOutcome::Success(value) => value.clone(),
            ToolOutcome::Failure { error } => json!({ "error": error }),
        }
    }
}

/// One tool invocation made during a chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
    pub result: ToolOutcome,
}

impl ToolCallRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value, result: ToolOutcome) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            result,
        }
    }

    pub fn is(&self, tool: ToolName) -> bool {
        self.name == tool.as_str()
    }

    /// True when this call is `tool` and it succeeded.
    pub fn succeeded_as(&self, tool: ToolName) -> bool {
        self.is(tool) && self.result.is_success()
    }

    /// Successful payload decoded as `T`, if it has that shape.
    pub fn payload<T: DeserializeOwned>(&self) -> Option<T> {
        match &self.result {
            ToolOutcome::Success(value) => serde_json::from_value(value.clone()).ok(),
            ToolOutcome::Failure { .. } => None,
        }
    }

    pub fn arguments_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.arguments.clone()).ok()
    }

    /// Content of the `tool` message sent back to the LLM.
    pub fn result_message(&self) -> String {
        self.result.to_value().to_string()
    }
}
