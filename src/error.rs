//! Error types for the SQL chat agent.
//!
//! This module defines the error taxonomy using `thiserror`. The propagation
//! policy is deliberately narrow: nothing below the agent session boundary
//! raises. Connection and execution faults are caught at the connection
//! handle and converted into `QueryOutcome::Failure` values; only
//! configuration errors are fatal, and only at startup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Missing required environment variables: {}", missing.join(", "))]
    Configuration { missing: Vec<String> },

    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("For security reasons, {keyword} operations are not allowed")]
    RejectedStatement { keyword: String },

    #[error("Query execution failed: {message}")]
    Execution { message: String },

    #[error("Agent error: {message}")]
    Reasoning { message: String },
}

impl AgentError {
    /// Create a configuration error naming the missing variables.
    pub fn configuration(missing: Vec<String>) -> Self {
        Self::Configuration { missing }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a rejected-statement error for a denylisted keyword.
    pub fn rejected(keyword: impl Into<String>) -> Self {
        Self::RejectedStatement {
            keyword: keyword.into(),
        }
    }

    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Create a reasoning-loop error.
    pub fn reasoning(message: impl Into<String>) -> Self {
        Self::Reasoning {
            message: message.into(),
        }
    }

    /// Check if this error is transient and cleared by lazy reconnect.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Convert sqlx errors into the agent taxonomy.
///
/// Transport-level faults become `Connection` (retried implicitly via
/// reconnect-on-demand); everything the server itself reported becomes
/// `Execution`, with the SQLSTATE code appended when available.
impl From<sqlx::Error> for AgentError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => AgentError::connection(msg.to_string()),
            sqlx::Error::Io(io_err) => AgentError::connection(format!("I/O error: {}", io_err)),
            sqlx::Error::Tls(tls_err) => AgentError::connection(format!("TLS error: {}", tls_err)),
            sqlx::Error::Protocol(msg) => AgentError::connection(format!("Protocol error: {}", msg)),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                AgentError::connection("Connection is closed")
            }
            sqlx::Error::Database(db_err) => {
                let message = match db_err.code() {
                    Some(code) => format!("{} (SQLSTATE: {})", db_err.message(), code),
                    None => db_err.message().to_string(),
                };
                AgentError::execution(message)
            }
            sqlx::Error::RowNotFound => AgentError::execution("No rows returned"),
            sqlx::Error::ColumnNotFound(col) => {
                AgentError::execution(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                AgentError::execution(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => AgentError::execution(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => AgentError::connection("Database worker crashed"),
            other => AgentError::execution(format!("Database error: {}", other)),
        }
    }
}

/// Result type alias for fallible agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
