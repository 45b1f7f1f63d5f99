//! Query safety gate.
//!
//! A pure text inspection deciding whether a candidate SQL statement may
//! run. The check is a whole-word denylist scan, not a parse: it rejects
//! any statement that starts with, or contains as a space-surrounded token,
//! one of the mutating keywords. It can over-reject (a column literally
//! named `update`) and under-reject (keywords inside comments, string
//! literals, or a second statement after a `;`). Only `select`-shaped
//! statements are the intended path; the heuristic is kept deliberately
//! conservative and deliberately simple.

/// Keywords that mark a statement as mutating.
pub const DENYLIST: [&str; 8] = [
    "insert", "update", "delete", "drop", "alter", "truncate", "create", "replace",
];

/// Decision returned by [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Statement may be sent to the database.
    Allowed,
    /// Statement is blocked; `reason` names the offending keyword.
    Rejected {
        keyword: &'static str,
        reason: String,
    },
}

impl GateDecision {
    /// Check whether the statement passed the gate.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Inspect a SQL statement against the denylist.
///
/// The input is trimmed and lower-cased; a keyword matches when the
/// statement starts with it or contains it surrounded by single spaces.
/// No side effects, no connection involved.
///
/// # Examples
///
/// ```
/// use sql_chat_agent::db::guard::{evaluate, GateDecision};
///
/// assert!(evaluate("SELECT * FROM users").is_allowed());
///
/// let decision = evaluate("DROP TABLE users");
/// assert!(matches!(decision, GateDecision::Rejected { keyword: "drop", .. }));
/// ```
pub fn evaluate(sql: &str) -> GateDecision {
    let normalized = sql.trim().to_lowercase();

    for keyword in DENYLIST {
        if normalized.starts_with(keyword) || normalized.contains(&format!(" {} ", keyword)) {
            return GateDecision::Rejected {
                keyword,
                reason: format!(
                    "For security reasons, {} operations are not allowed",
                    keyword.to_uppercase()
                ),
            };
        }
    }

    GateDecision::Allowed
}

/// Check whether a gate-passing statement is `select`-shaped.
///
/// Determines the execution path: selects fetch rows, anything else that
/// slipped past the denylist executes and reports affected rows.
pub fn is_select(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}
