//! Query outcome model.
//!
//! Every statement sent through the connection handle resolves to a
//! [`QueryOutcome`] value; driver faults, gate rejections and connect
//! failures are all folded into `Failure` so the tool-calling loop never
//! has to handle a raised error.

use serde_json::{Map, Value as JsonValue, json};

/// Tagged outcome of a statement execution.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Statement ran; rows are mappings from column name to value, in the
    /// statement's projection order, in the database's natural row order.
    Success {
        columns: Vec<String>,
        rows: Vec<Map<String, JsonValue>>,
    },
    /// Statement was rejected or failed; `message` is shown verbatim.
    Failure { message: String },
}

impl QueryOutcome {
    /// Create a success outcome.
    pub fn success(columns: Vec<String>, rows: Vec<Map<String, JsonValue>>) -> Self {
        Self::Success { columns, rows }
    }

    /// Create a failure outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Create the single-synthetic-row success used for non-select
    /// statements that passed the gate.
    pub fn rows_affected(count: u64) -> Self {
        let mut row = Map::new();
        row.insert(
            "message".to_string(),
            JsonValue::String(format!(
                "Query executed successfully. Rows affected: {}",
                count
            )),
        );
        Self::Success {
            columns: vec!["message".to_string()],
            rows: vec![row],
        }
    }

    /// Check whether the statement succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Number of rows in a success outcome, 0 for failures.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Success { rows, .. } => rows.len(),
            Self::Failure { .. } => 0,
        }
    }

    /// Serialize to the wire shape consumed by the reasoning loop and the
    /// UI layer: `{"success": true, "data": [...]}` or
    /// `{"success": false, "error": "..."}`.
    pub fn to_payload(&self) -> JsonValue {
        match self {
            Self::Success { rows, .. } => json!({
                "success": true,
                "data": rows,
            }),
            Self::Failure { message } => json!({
                "success": false,
                "error": message,
            }),
        }
    }
}
