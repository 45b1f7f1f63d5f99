//! Integration tests for the agent session, using scripted reasoning loops.
//!
//! The reasoning loop is an external collaborator; these doubles exercise
//! the session's side of the contract without a model or a database.

use async_trait::async_trait;
use sql_chat_agent::agent::tools::Toolset;
use sql_chat_agent::agent::{ReasoningLoop, SqlAgentSession};
use sql_chat_agent::db::ConnectionParams;
use sql_chat_agent::error::{AgentError, AgentResult};
use sql_chat_agent::models::{ConversationTurn, Role};
use std::sync::Arc;
use std::time::Duration;

fn unreachable_params() -> ConnectionParams {
    ConnectionParams {
        host: "127.0.0.1".to_string(),
        port: 1,
        database: "session_test".to_string(),
        user: "nobody".to_string(),
        password: "secret".to_string(),
        idle_timeout: Duration::from_secs(600),
    }
}

/// Returns a canned answer without calling any tool.
struct CannedLoop {
    answer: String,
}

#[async_trait]
impl ReasoningLoop for CannedLoop {
    async fn respond(
        &self,
        _utterance: &str,
        _history: &[ConversationTurn],
        _tools: &Toolset,
    ) -> AgentResult<String> {
        Ok(self.answer.clone())
    }
}

/// Always fails, the way a model outage would.
struct FailingLoop;

#[async_trait]
impl ReasoningLoop for FailingLoop {
    async fn respond(
        &self,
        _utterance: &str,
        _history: &[ConversationTurn],
        _tools: &Toolset,
    ) -> AgentResult<String> {
        Err(AgentError::reasoning("model endpoint unavailable"))
    }
}

/// Echoes the history length so history plumbing is observable.
struct HistoryEchoLoop;

#[async_trait]
impl ReasoningLoop for HistoryEchoLoop {
    async fn respond(
        &self,
        utterance: &str,
        history: &[ConversationTurn],
        _tools: &Toolset,
    ) -> AgentResult<String> {
        Ok(format!("history={} input={}", history.len(), utterance))
    }
}

#[tokio::test]
async fn test_successful_turn_builds_reply_and_transcript() {
    let loop_ = Arc::new(CannedLoop {
        answer: "There are 42 users.".to_string(),
    });
    let mut session =
        SqlAgentSession::start(unreachable_params(), Duration::from_secs(600), loop_).await;

    let reply = session.run("how many users are there?").await;

    assert!(reply.success);
    assert_eq!(reply.response.as_deref(), Some("There are 42 users."));
    assert!(reply.error.is_none());
    // No statement ran and no fenced sql block: no query to report.
    assert!(reply.last_query.is_none());

    let turns = session.transcript().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].text, "how many users are there?");
    assert_eq!(turns[1].role, Role::Agent);

    session.shutdown().await;
}

#[tokio::test]
async fn test_fenced_sql_block_recovers_last_query() {
    let loop_ = Arc::new(CannedLoop {
        answer: "I would run:\n```sql\nSELECT count(*) FROM users;\n```\nShall I?".to_string(),
    });
    let mut session =
        SqlAgentSession::start(unreachable_params(), Duration::from_secs(600), loop_).await;

    let reply = session.run("count the users").await;

    assert!(reply.success);
    assert_eq!(
        reply.last_query.as_deref(),
        Some("SELECT count(*) FROM users;")
    );

    session.shutdown().await;
}

#[tokio::test]
async fn test_failed_turn_reports_error_and_preserves_session() {
    let mut session = SqlAgentSession::start(
        unreachable_params(),
        Duration::from_secs(600),
        Arc::new(FailingLoop),
    )
    .await;

    let reply = session.run("anything").await;

    assert!(!reply.success);
    assert!(reply.response.is_none());
    assert!(
        reply
            .error
            .as_deref()
            .unwrap()
            .contains("model endpoint unavailable")
    );
    // Failed turns do not extend the transcript.
    assert!(session.transcript().is_empty());

    session.shutdown().await;
}

#[tokio::test]
async fn test_history_is_passed_and_bounded() {
    let mut session = SqlAgentSession::start(
        unreachable_params(),
        Duration::from_secs(600),
        Arc::new(HistoryEchoLoop),
    )
    .await;

    // First turn sees an empty history.
    let reply = session.run("first").await;
    assert_eq!(reply.response.as_deref(), Some("history=0 input=first"));

    // Later turns see the bounded window: after 11 completed pairs the
    // 12th turn still sees only 10 pairs (20 entries).
    for i in 0..10 {
        session.run(&format!("turn {}", i)).await;
    }
    let reply = session.run("the twelfth").await;
    assert_eq!(
        reply.response.as_deref(),
        Some("history=20 input=the twelfth")
    );

    session.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let session = SqlAgentSession::start(
        unreachable_params(),
        Duration::from_secs(600),
        Arc::new(FailingLoop),
    )
    .await;

    assert!(!session.is_connected().await);
    session.shutdown().await;
    session.shutdown().await;
}
