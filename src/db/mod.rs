//! Database layer: the guarded single-connection lifecycle.
//!
//! - Safety gate over free-text SQL
//! - One shared, lazily reconnected PostgreSQL connection
//! - Background idle monitor
//! - `information_schema` introspection passthroughs
//! - Row-to-JSON type mappings

pub mod connection;
pub mod guard;
pub mod monitor;
pub mod schema;
pub mod types;

pub use connection::{ConnectionHandle, ConnectionParams};
pub use guard::{GateDecision, evaluate};
pub use monitor::ConnectionMonitor;
pub use schema::SchemaInspector;
