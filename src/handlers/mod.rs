pub mod chat;
pub mod health;
pub mod plan;
pub mod tools;

pub use chat::chat_handler;
pub use health::{health_handler, ready_handler};
pub use plan::{compile_handler, execute_handler, status_handler};
pub use tools::tools_handler;
