//! Single-connection lifecycle management.
//!
//! The agent shares exactly one physical PostgreSQL connection between the
//! foreground turn path and the background idle monitor. [`ConnectionHandle`]
//! owns that connection behind one mutex together with its last-use
//! timestamp and the record of the most recent executed statement, so a
//! forced close can never tear the connection down mid-statement.
//!
//! Failure semantics: every failure mode (gate rejection, connect failure,
//! execution error) is caught here and converted into a
//! [`QueryOutcome::Failure`] value. Nothing propagates as an error to the
//! caller, which makes the handle safe to drive from an automated
//! tool-calling loop.

use crate::db::guard::{self, GateDecision};
use crate::db::types::{pg_column_names, pg_row_to_json};
use crate::error::AgentError;
use crate::models::QueryOutcome;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{ConnectOptions, Connection};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Immutable connection parameters, sourced from process configuration.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Inactivity window after which `close(false)` and the monitor may
    /// release the physical connection.
    pub idle_timeout: Duration,
}

impl ConnectionParams {
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

/// The mutually exclusive region: connection, timestamp and statement
/// record change together or not at all.
struct HandleState {
    conn: Option<PgConnection>,
    last_used: Instant,
    last_statement: Option<String>,
    statements_run: u64,
}

/// Owns one lazily-(re)connected PostgreSQL connection.
///
/// The handle persists for the lifetime of an agent session; the physical
/// connection inside it may be torn down and recreated many times.
pub struct ConnectionHandle {
    params: ConnectionParams,
    state: Mutex<HandleState>,
}

impl ConnectionHandle {
    /// Create a handle. No connection is opened until first use.
    pub fn new(params: ConnectionParams) -> Self {
        Self {
            params,
            state: Mutex::new(HandleState {
                conn: None,
                last_used: Instant::now(),
                last_statement: None,
                statements_run: 0,
            }),
        }
    }

    /// Ensure a live connection exists.
    ///
    /// Absent connection: open one. Present connection: probe it with a
    /// trivial round trip and reopen if stale. Updates `last_used` on entry
    /// regardless of outcome. Never returns an error; after an
    /// unrecoverable failure the slot stays empty and the next `execute`
    /// observes it as a failure.
    pub async fn ensure_connected(&self) {
        let mut state = self.state.lock().await;
        self.ensure_connected_locked(&mut state).await;
    }

    async fn ensure_connected_locked(&self, state: &mut HandleState) {
        state.last_used = Instant::now();

        if let Some(mut conn) = state.conn.take() {
            let probe = sqlx::query("SELECT 1").execute(&mut conn).await;
            match probe {
                Ok(_) => {
                    state.conn = Some(conn);
                    return;
                }
                Err(e) => {
                    // Stale connection; drop it and fall through to reopen.
                    warn!(error = %e, "Connection probe failed, reconnecting");
                }
            }
        }

        let connected = self.params.connect_options().connect().await;
        match connected {
            Ok(conn) => {
                info!(
                    host = %self.params.host,
                    database = %self.params.database,
                    "Connected to PostgreSQL database"
                );
                state.conn = Some(conn);
            }
            Err(e) => {
                let err = AgentError::from(e);
                warn!(error = %err, "Error connecting to PostgreSQL database");
                state.conn = None;
            }
        }
    }

    /// Execute a statement, applying the safety gate first.
    ///
    /// Gate rejections return immediately without touching the connection.
    /// Allowed statements run inside an explicit transaction: selects fetch
    /// every row and commit; other gate-passing statements execute, commit
    /// and report an affected-row count as a single synthetic row. Driver
    /// errors roll the transaction back and surface as `Failure` values.
    pub async fn execute(&self, sql: &str) -> QueryOutcome {
        match guard::evaluate(sql) {
            GateDecision::Rejected { keyword, reason } => {
                debug!(keyword = keyword, "Statement rejected by safety gate");
                return QueryOutcome::failure(reason);
            }
            GateDecision::Allowed => {}
        }

        let mut state = self.state.lock().await;
        self.ensure_connected_locked(&mut state).await;
        state.last_used = Instant::now();

        let HandleState {
            conn,
            last_statement,
            statements_run,
            ..
        } = &mut *state;
        let Some(conn) = conn.as_mut() else {
            return QueryOutcome::failure("unable to connect to the database");
        };

        *last_statement = Some(sql.to_string());
        *statements_run += 1;

        let outcome = run_statement(conn, sql).await;

        if let QueryOutcome::Failure { message } = &outcome {
            warn!(error = %message, "Error executing query");
        } else {
            debug!(rows = outcome.row_count(), "Query executed");
        }
        outcome
    }

    /// Close the physical connection.
    ///
    /// Returns true when a connection was actually closed: always under
    /// `force`, otherwise only once the idle timeout has elapsed since
    /// `last_used`.
    pub async fn close(&self, force: bool) -> bool {
        let mut state = self.state.lock().await;
        let Some(conn) = state.conn.take() else {
            return false;
        };

        if force || state.last_used.elapsed() > self.params.idle_timeout {
            if let Err(e) = conn.close().await {
                warn!(error = %e, "Error closing connection");
            }
            info!("Connection to PostgreSQL database closed");
            true
        } else {
            // Not idle long enough - put it back untouched.
            state.conn = Some(conn);
            false
        }
    }

    /// Whether a live connection is currently held.
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.conn.is_some()
    }

    /// The most recent statement that reached the database, if any.
    pub async fn last_statement(&self) -> Option<String> {
        self.state.lock().await.last_statement.clone()
    }

    /// Count of statements that reached the database over the handle's
    /// lifetime. Gate rejections and connect failures do not count.
    pub async fn statements_executed(&self) -> u64 {
        self.state.lock().await.statements_run
    }

    /// The configured idle timeout.
    pub fn idle_timeout(&self) -> Duration {
        self.params.idle_timeout
    }
}

/// Run one gate-passing statement on a live connection.
async fn run_statement(conn: &mut PgConnection, sql: &str) -> QueryOutcome {
    let mut tx = match conn.begin().await {
        Ok(tx) => tx,
        Err(e) => return QueryOutcome::failure(AgentError::from(e).to_string()),
    };

    if guard::is_select(sql) {
        let fetched = sqlx::query(sql).fetch_all(&mut *tx).await;
        let rows: Vec<PgRow> = match fetched {
            Ok(rows) => rows,
            Err(e) => {
                let _ = tx.rollback().await;
                return QueryOutcome::failure(AgentError::from(e).to_string());
            }
        };

        if let Err(e) = tx.commit().await {
            return QueryOutcome::failure(AgentError::from(e).to_string());
        }

        let columns = rows.first().map(pg_column_names).unwrap_or_default();
        let json_rows = rows.iter().map(pg_row_to_json).collect();
        QueryOutcome::success(columns, json_rows)
    } else {
        // Not a select, but it matched none of the denylist words (e.g. an
        // unrecognized statement form): execute and report affected rows.
        let executed = sqlx::query(sql).execute(&mut *tx).await;
        let result = match executed {
            Ok(result) => result,
            Err(e) => {
                let _ = tx.rollback().await;
                return QueryOutcome::failure(AgentError::from(e).to_string());
            }
        };

        if let Err(e) = tx.commit().await {
            return QueryOutcome::failure(AgentError::from(e).to_string());
        }

        QueryOutcome::rows_affected(result.rows_affected())
    }
}
