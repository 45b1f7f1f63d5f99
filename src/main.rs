//! SQL chat agent - REPL harness.
//!
//! A thin in-process stand-in for the chat UI: reads a line, runs it
//! through an agent session, prints the reply. The bundled reasoning loop
//! is `DirectSqlLoop`, which treats each line as literal SQL; embedders
//! supply a real tool-calling loop through the library API.

use clap::Parser;
use sql_chat_agent::agent::extract::extract_json_table;
use sql_chat_agent::agent::{DirectSqlLoop, SqlAgentSession};
use sql_chat_agent::config::Config;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_tracing(&config);

    let missing = config.missing_required();
    if !missing.is_empty() {
        eprintln!(
            "Error: Missing required environment variables: {}",
            missing.join(", ")
        );
        eprintln!("Please set these variables in your environment or .env file");
        std::process::exit(1);
    }

    let params = match config.connection_params() {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        host = %config.host,
        database = %config.database,
        "Starting SQL chat agent v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut session =
        SqlAgentSession::start(params, config.idle_timeout(), Arc::new(DirectSqlLoop)).await;

    println!("SQL chat agent ({})", session.id());
    println!("Type a SQL statement, or \\q to quit.");

    let stdin = std::io::stdin();
    loop {
        print!("sql> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "\\q" || line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = session.run(line).await;
        print_reply(&reply);
    }

    session.shutdown().await;
    info!("Session ended");
}

/// Render a reply the way the chat UI would: table data from the fenced
/// json block, remaining narration as plain text, last query echoed.
fn print_reply(reply: &sql_chat_agent::AgentReply) {
    if !reply.success {
        eprintln!(
            "Error: {}",
            reply.error.as_deref().unwrap_or("unknown error")
        );
        return;
    }

    let response = reply.response.as_deref().unwrap_or_default();
    match extract_json_table(response) {
        Some((rows, narration)) => {
            if !narration.is_empty() {
                println!("{}", narration);
            }
            println!("{} row(s):", rows.len());
            for row in &rows {
                match serde_json::to_string(row) {
                    Ok(line) => println!("  {}", line),
                    Err(_) => println!("  {:?}", row),
                }
            }
        }
        None => println!("{}", response),
    }

    if let Some(query) = &reply.last_query {
        println!("-- last query: {}", query);
    }
}
