//! LLM capability: chat-completions wire types and the provider client.

pub mod client;
pub mod types;

pub use client::{ChatCompletion, HttpCompletionClient};
pub use types::{ChatMessage, FunctionCall, Role, ToolCall, ToolChoice};
