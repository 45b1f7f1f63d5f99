//! SQL chat agent core.
//!
//! A natural-language-to-SQL assistant kernel for PostgreSQL: a safety
//! gate over free-text SQL, a single shared connection that lazily
//! reconnects, a background idle monitor, and an explicit session object
//! wrapping an externally supplied tool-calling reasoning loop.

pub mod agent;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use agent::{AgentReply, SqlAgentSession};
pub use config::Config;
pub use db::{ConnectionHandle, ConnectionMonitor, ConnectionParams};
pub use error::AgentError;
