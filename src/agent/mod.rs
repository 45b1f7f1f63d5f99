//! Agent layer: the tool-calling boundary and the session object.

pub mod extract;
pub mod reasoning;
pub mod session;
pub mod tools;

pub use reasoning::{DirectSqlLoop, ReasoningLoop};
pub use session::{AgentReply, SqlAgentSession};
pub use tools::{ToolDefinition, Toolset};
