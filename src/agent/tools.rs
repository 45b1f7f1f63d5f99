//! Tool surface exposed to the reasoning loop.
//!
//! Five callables: `execute_query` plus four read-only schema
//! introspection passthroughs. Every call resolves to the
//! `{"success": ..., "data" | "error": ...}` payload shape so the loop can
//! render results and faults without special cases. The dotted
//! `"schema.table"` argument form is split on the first `.`; a bare table
//! name is looked up in `public`.

use crate::db::{ConnectionHandle, SchemaInspector};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tracing::debug;

/// Tool descriptor handed to the reasoning loop for function calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

/// The callables the reasoning loop may invoke.
pub struct Toolset {
    handle: Arc<ConnectionHandle>,
}

impl Toolset {
    pub fn new(handle: Arc<ConnectionHandle>) -> Self {
        Self { handle }
    }

    /// Execute a SQL statement through the gate and the shared connection.
    pub async fn execute_query(&self, sql: &str) -> JsonValue {
        debug!(sql = %sql, "Tool call: execute_query");
        self.handle.execute(sql).await.to_payload()
    }

    /// List user-visible schema names.
    pub async fn list_schemas(&self) -> Vec<String> {
        debug!("Tool call: list_schemas");
        SchemaInspector::list_schemas(&self.handle).await
    }

    /// List tables within a schema.
    pub async fn list_tables(&self, schema: &str) -> Vec<String> {
        debug!(schema = schema, "Tool call: list_tables");
        SchemaInspector::list_tables(&self.handle, schema).await
    }

    /// Column metadata for a `"schema.table"` (or bare table) name.
    pub async fn get_table_schema(&self, qualified: &str) -> JsonValue {
        let (schema, table) = split_qualified(qualified);
        debug!(schema = schema, table = table, "Tool call: get_table_schema");
        SchemaInspector::table_columns(&self.handle, schema, table)
            .await
            .to_payload()
    }

    /// Foreign keys for a `"schema.table"` (or bare table) name.
    pub async fn get_foreign_keys(&self, qualified: &str) -> JsonValue {
        let (schema, table) = split_qualified(qualified);
        debug!(schema = schema, table = table, "Tool call: get_foreign_keys");
        SchemaInspector::foreign_keys(&self.handle, schema, table)
            .await
            .to_payload()
    }

    /// Dispatch a tool call by name.
    ///
    /// Always returns the payload shape, including for unknown tool names
    /// and malformed arguments, so the loop never has to handle a fault.
    pub async fn invoke(&self, name: &str, arguments: &JsonValue) -> JsonValue {
        match name {
            "execute_query" => match string_arg(arguments, "sql_query") {
                Some(sql) => self.execute_query(sql).await,
                None => missing_argument("sql_query"),
            },
            "list_schemas" => json!({ "success": true, "data": self.list_schemas().await }),
            "list_tables" => match string_arg(arguments, "schema_name") {
                Some(schema) => {
                    json!({ "success": true, "data": self.list_tables(schema).await })
                }
                None => missing_argument("schema_name"),
            },
            "get_table_schema" => match string_arg(arguments, "table_name") {
                Some(table) => self.get_table_schema(table).await,
                None => missing_argument("table_name"),
            },
            "get_foreign_keys" => match string_arg(arguments, "table_name") {
                Some(table) => self.get_foreign_keys(table).await,
                None => missing_argument("table_name"),
            },
            other => json!({
                "success": false,
                "error": format!("Unknown tool: {}", other),
            }),
        }
    }

    /// Descriptors for every tool, for loops that do function calling.
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "execute_query".to_string(),
                description: "Executes a SQL query. Input should be a valid SQL query string. \
                              Statements that modify the database are rejected."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "sql_query": {
                            "type": "string",
                            "description": "The SQL statement to execute"
                        }
                    },
                    "required": ["sql_query"]
                }),
            },
            ToolDefinition {
                name: "list_schemas".to_string(),
                description: "List all schema names in the database.".to_string(),
                parameters: json!({ "type": "object", "properties": {}, "required": [] }),
            },
            ToolDefinition {
                name: "list_tables".to_string(),
                description: "List all table names in a specific schema.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "schema_name": {
                            "type": "string",
                            "description": "Schema to list tables from"
                        }
                    },
                    "required": ["schema_name"]
                }),
            },
            ToolDefinition {
                name: "get_table_schema".to_string(),
                description: "Get column names, types, nullability and defaults for a table. \
                              Accepts 'schema.table' or a bare table name in the public schema."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "table_name": {
                            "type": "string",
                            "description": "Table name, optionally schema-qualified"
                        }
                    },
                    "required": ["table_name"]
                }),
            },
            ToolDefinition {
                name: "get_foreign_keys".to_string(),
                description: "Get foreign key relationships for a table. \
                              Accepts 'schema.table' or a bare table name in the public schema."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "table_name": {
                            "type": "string",
                            "description": "Table name, optionally schema-qualified"
                        }
                    },
                    "required": ["table_name"]
                }),
            },
        ]
    }
}

/// Split `"schema.table"` on the first dot; bare names default to `public`.
pub fn split_qualified(name: &str) -> (&str, &str) {
    match name.split_once('.') {
        Some((schema, table)) => (schema, table),
        None => ("public", name),
    }
}

fn string_arg<'a>(arguments: &'a JsonValue, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(|v| v.as_str())
}

fn missing_argument(key: &str) -> JsonValue {
    json!({
        "success": false,
        "error": format!("Missing required argument: {}", key),
    })
}
