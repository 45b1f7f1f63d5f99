//! Integration tests for the query safety gate.
//!
//! These tests verify the denylist contract end to end: every mutating
//! keyword is rejected as a prefix and as an embedded whole word, and a
//! rejected statement never causes a connection attempt.

use sql_chat_agent::db::guard::{DENYLIST, GateDecision, evaluate};
use sql_chat_agent::db::{ConnectionHandle, ConnectionParams};
use sql_chat_agent::models::QueryOutcome;
use std::time::Duration;

/// Connection parameters that point at nothing; the gate must reject
/// before these are ever used.
fn unreachable_params() -> ConnectionParams {
    ConnectionParams {
        host: "127.0.0.1".to_string(),
        port: 1,
        database: "gate_test".to_string(),
        user: "nobody".to_string(),
        password: "secret".to_string(),
        idle_timeout: Duration::from_secs(600),
    }
}

// =========================================================================
// Denylist matrix
// =========================================================================

#[test]
fn test_every_keyword_rejected_as_prefix() {
    for keyword in DENYLIST {
        for variant in [
            keyword.to_string(),
            keyword.to_uppercase(),
            format!(
                "{}{}",
                keyword[..1].to_uppercase(),
                &keyword[1..]
            ),
        ] {
            let sql = format!("{} whatever comes next", variant);
            match evaluate(&sql) {
                GateDecision::Rejected { keyword: hit, .. } => assert_eq!(hit, keyword),
                GateDecision::Allowed => panic!("'{}' must be rejected", sql),
            }
        }
    }
}

#[test]
fn test_every_keyword_rejected_as_embedded_token() {
    for keyword in DENYLIST {
        let sql = format!("SELECT 1 ; {} something", keyword.to_uppercase());
        assert!(
            !evaluate(&sql).is_allowed(),
            "embedded '{}' must be rejected",
            keyword
        );
    }
}

#[test]
fn test_rejection_reason_names_the_keyword() {
    match evaluate("DROP TABLE users;") {
        GateDecision::Rejected { reason, .. } => {
            assert_eq!(
                reason,
                "For security reasons, DROP operations are not allowed"
            );
        }
        GateDecision::Allowed => panic!("DROP must be rejected"),
    }
}

#[test]
fn test_select_statements_pass() {
    let allowed = [
        "SELECT 1;",
        "select * from users",
        "  SELECT count(*) FROM orders WHERE total > 100  ",
        "SELECT updated_at, created_by FROM audit_log",
        "WITH t AS (SELECT 1 AS x) SELECT x FROM t",
    ];
    for sql in allowed {
        assert!(evaluate(sql).is_allowed(), "'{}' must pass", sql);
    }
}

// =========================================================================
// Rejected statements never touch the connection
// =========================================================================

#[tokio::test]
async fn test_update_rejected_before_any_connection_attempt() {
    let handle = ConnectionHandle::new(unreachable_params());
    let outcome = handle.execute("UPDATE users SET x = 1").await;

    match outcome {
        QueryOutcome::Failure { message } => {
            assert!(message.contains("UPDATE operations are not allowed"));
        }
        QueryOutcome::Success { .. } => panic!("UPDATE must fail"),
    }

    assert!(!handle.is_connected().await);
    assert_eq!(handle.statements_executed().await, 0);
    assert!(handle.last_statement().await.is_none());
}

#[tokio::test]
async fn test_drop_scenario_matches_contract() {
    let handle = ConnectionHandle::new(unreachable_params());
    let payload = handle.execute("DROP TABLE users;").await.to_payload();

    assert_eq!(payload["success"], serde_json::json!(false));
    let error = payload["error"].as_str().unwrap();
    assert!(error.contains("DROP operations are not allowed"), "{}", error);
}

#[tokio::test]
async fn test_gate_failure_distinct_from_connect_failure() {
    let handle = ConnectionHandle::new(unreachable_params());

    // Denylisted: gate reason, no connect attempt.
    let rejected = handle.execute("DELETE FROM users").await;
    match rejected {
        QueryOutcome::Failure { message } => {
            assert!(message.contains("DELETE operations are not allowed"));
        }
        QueryOutcome::Success { .. } => panic!("DELETE must fail"),
    }

    // Allowed but unreachable: connect failure reason.
    let unreachable = handle.execute("SELECT 1").await;
    match unreachable {
        QueryOutcome::Failure { message } => {
            assert_eq!(message, "unable to connect to the database");
        }
        QueryOutcome::Success { .. } => panic!("port 1 cannot serve PostgreSQL"),
    }
}
