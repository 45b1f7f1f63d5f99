//! Agent session: the unit of one user's conversation with the database.
//!
//! A session is constructed explicitly, owns every moving part (connection
//! handle, idle monitor, toolset, transcript, reasoning loop) and is torn
//! down explicitly. There is no implicit singleton; embedders create one
//! session per chat and call [`SqlAgentSession::shutdown`] when it ends.

use crate::agent::extract::extract_fenced;
use crate::agent::reasoning::ReasoningLoop;
use crate::agent::tools::Toolset;
use crate::db::{ConnectionHandle, ConnectionMonitor, ConnectionParams};
use crate::models::Transcript;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Reply contract between the agent and the UI layer.
///
/// `{success: true, response, last_query}` on success,
/// `{success: false, error}` on failure; absent fields are omitted from the
/// serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentReply {
    /// Create a successful reply.
    pub fn ok(response: impl Into<String>, last_query: Option<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            last_query,
            error: None,
        }
    }

    /// Create a failed reply.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            last_query: None,
            error: Some(message.into()),
        }
    }
}

/// One chat session over one guarded database connection.
pub struct SqlAgentSession {
    id: String,
    handle: Arc<ConnectionHandle>,
    monitor: ConnectionMonitor,
    tools: Toolset,
    transcript: Transcript,
    reasoning: Arc<dyn ReasoningLoop>,
}

impl SqlAgentSession {
    /// Start a session: open the first connection eagerly (failure is
    /// non-fatal; the handle reconnects on demand) and spawn the idle
    /// monitor.
    pub async fn start(
        params: ConnectionParams,
        idle_timeout: Duration,
        reasoning: Arc<dyn ReasoningLoop>,
    ) -> Self {
        let id = format!("sess_{}", uuid::Uuid::new_v4().simple());
        let handle = Arc::new(ConnectionHandle::new(params));
        handle.ensure_connected().await;

        let monitor = ConnectionMonitor::start(Arc::clone(&handle), idle_timeout);
        let tools = Toolset::new(Arc::clone(&handle));

        info!(session_id = %id, "Agent session started");

        Self {
            id,
            handle,
            monitor,
            tools,
            transcript: Transcript::new(),
            reasoning,
        }
    }

    /// Handle one user turn.
    ///
    /// Delegates to the reasoning loop, then recovers the last executed SQL:
    /// the handle's own record wins when a statement actually ran during
    /// this turn; otherwise a fenced ```sql block in the answer is used;
    /// otherwise there is no query to report, which is a valid outcome.
    /// Loop failures become `{success: false, error}` replies; the session
    /// and its transcript stay usable for the next turn.
    pub async fn run(&mut self, utterance: &str) -> AgentReply {
        self.monitor.update_activity();
        let executed_before = self.handle.statements_executed().await;

        let result = self
            .reasoning
            .respond(utterance, self.transcript.turns(), &self.tools)
            .await;

        match result {
            Ok(answer) => {
                let last_query = if self.handle.statements_executed().await > executed_before {
                    self.handle.last_statement().await
                } else {
                    extract_fenced(&answer, "sql")
                };

                self.transcript.push_pair(utterance, &answer);
                AgentReply::ok(answer, last_query)
            }
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Error in agent turn");
                AgentReply::error(e.to_string())
            }
        }
    }

    /// The session identifier used in logs.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The retained conversation transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The toolset, for embedders that drive tools outside a turn.
    pub fn tools(&self) -> &Toolset {
        &self.tools
    }

    /// Whether the underlying connection is currently live.
    pub async fn is_connected(&self) -> bool {
        self.handle.is_connected().await
    }

    /// Tear the session down: stop the monitor (bounded join) and
    /// force-close the connection.
    pub async fn shutdown(&self) {
        self.monitor.stop().await;
        info!(session_id = %self.id, "Agent session shut down");
    }
}
