//! Configuration handling for the SQL chat agent.
//!
//! Every setting doubles as a CLI flag and an environment variable. The
//! environment names match the deployment convention of the original
//! service (`POSTGRES_*` plus the model API key), so the agent can be
//! dropped into an existing `.env` unchanged.

use crate::db::ConnectionParams;
use crate::error::{AgentError, AgentResult};
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_DATABASE: &str = "postgres";
pub const DEFAULT_USER: &str = "postgres";

/// Idle timeout after which the monitor closes the connection (10 minutes).
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Configuration for the SQL chat agent.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sql-chat-agent",
    about = "Natural-language SQL assistant core for PostgreSQL",
    version,
    author
)]
pub struct Config {
    /// PostgreSQL server hostname
    #[arg(long, default_value = DEFAULT_HOST, env = "POSTGRES_HOST")]
    pub host: String,

    /// PostgreSQL server port
    #[arg(long, default_value_t = DEFAULT_PORT, env = "POSTGRES_PORT")]
    pub port: u16,

    /// Database name
    #[arg(long, default_value = DEFAULT_DATABASE, env = "POSTGRES_DB")]
    pub database: String,

    /// Database user
    #[arg(long, default_value = DEFAULT_USER, env = "POSTGRES_USER")]
    pub user: String,

    /// Database password (required)
    #[arg(long, env = "POSTGRES_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Seconds of inactivity before the idle connection is closed
    #[arg(
        long,
        default_value_t = DEFAULT_IDLE_TIMEOUT_SECS,
        env = "POSTGRES_CONNECTION_TIMEOUT"
    )]
    pub connection_timeout: u64,

    /// API key handed to the reasoning loop (required)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "AGENT_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "AGENT_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            user: DEFAULT_USER.to_string(),
            password: None,
            connection_timeout: DEFAULT_IDLE_TIMEOUT_SECS,
            api_key: None,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Names of required environment variables that are not set.
    ///
    /// Startup fails fast with this list; everything else has a usable
    /// default.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.password.as_deref().is_none_or(str::is_empty) {
            missing.push("POSTGRES_PASSWORD");
        }
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            missing.push("OPENAI_API_KEY");
        }
        missing
    }

    /// Build the immutable connection parameters, validating required values.
    pub fn connection_params(&self) -> AgentResult<ConnectionParams> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(AgentError::configuration(
                missing.into_iter().map(String::from).collect(),
            ));
        }
        Ok(ConnectionParams {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone().unwrap_or_default(),
            idle_timeout: self.idle_timeout(),
        })
    }

    /// Get the idle timeout as a Duration.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.connection_timeout, DEFAULT_IDLE_TIMEOUT_SECS);
    }

    #[test]
    fn test_missing_required_lists_both() {
        let config = Config::default();
        let missing = config.missing_required();
        assert_eq!(missing, vec!["POSTGRES_PASSWORD", "OPENAI_API_KEY"]);
    }

    #[test]
    fn test_missing_required_empty_string_counts_as_missing() {
        let config = Config {
            password: Some(String::new()),
            api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        assert_eq!(config.missing_required(), vec!["POSTGRES_PASSWORD"]);
    }

    #[test]
    fn test_connection_params_requires_password() {
        let config = Config {
            api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        let err = config.connection_params().unwrap_err();
        assert!(err.to_string().contains("POSTGRES_PASSWORD"));
    }

    #[test]
    fn test_connection_params_built_from_config() {
        let config = Config {
            host: "db.internal".to_string(),
            port: 5433,
            database: "sales".to_string(),
            user: "reader".to_string(),
            password: Some("secret".to_string()),
            api_key: Some("sk-test".to_string()),
            connection_timeout: 60,
            ..Config::default()
        };
        let params = config.connection_params().unwrap();
        assert_eq!(params.host, "db.internal");
        assert_eq!(params.port, 5433);
        assert_eq!(params.database, "sales");
        assert_eq!(params.user, "reader");
        assert_eq!(params.idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_idle_timeout_duration() {
        let config = Config {
            connection_timeout: 120,
            ..Config::default()
        };
        assert_eq!(config.idle_timeout(), Duration::from_secs(120));
    }
}
