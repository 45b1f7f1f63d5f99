//! The reasoning-loop boundary.
//!
//! The actual tool-calling loop (which model, which prompts, how many tool
//! rounds) is an external collaborator supplied by the embedder. This crate
//! only defines the seam: given the user utterance, the bounded transcript
//! and the toolset, produce the final narrated answer.

use crate::agent::tools::Toolset;
use crate::error::{AgentError, AgentResult};
use crate::models::ConversationTurn;
use async_trait::async_trait;

/// An externally supplied tool-calling loop.
///
/// Implementations may invoke the toolset zero or more times before
/// producing the answer. Errors surface to the user as a failed turn; the
/// session itself stays usable.
#[async_trait]
pub trait ReasoningLoop: Send + Sync {
    async fn respond(
        &self,
        utterance: &str,
        history: &[ConversationTurn],
        tools: &Toolset,
    ) -> AgentResult<String>;
}

/// Degenerate loop that treats each utterance as literal SQL.
///
/// No model involved: the utterance goes straight to `execute_query` and
/// the answer embeds the result as a fenced `json` block in the shape the
/// presentation layer renders as a table. Used by the bundled REPL harness
/// and as a test double.
pub struct DirectSqlLoop;

#[async_trait]
impl ReasoningLoop for DirectSqlLoop {
    async fn respond(
        &self,
        utterance: &str,
        _history: &[ConversationTurn],
        tools: &Toolset,
    ) -> AgentResult<String> {
        let payload = tools.execute_query(utterance).await;

        if payload["success"] == serde_json::json!(true) {
            let data = serde_json::to_string_pretty(&payload["data"])
                .map_err(|e| AgentError::reasoning(e.to_string()))?;
            Ok(format!("Query executed.\n```json\n{}\n```", data))
        } else {
            let message = payload["error"].as_str().unwrap_or("unknown error");
            Err(AgentError::execution(message))
        }
    }
}
