//! Schema introspection passthroughs.
//!
//! Read-only `information_schema` lookups the reasoning loop can call to
//! orient itself before writing a query. Each call is a straight SELECT
//! through the shared [`ConnectionHandle`], so introspection shares the
//! same lifecycle, gate and last-use bookkeeping as user queries.
//!
//! On failure the lookups degrade the way the original service did:
//! `list_schemas` falls back to `["public"]`, the others to empty results.

use crate::db::connection::ConnectionHandle;
use crate::models::QueryOutcome;
use tracing::warn;

/// Schema inspector over the shared connection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// All user-visible schema names.
    pub async fn list_schemas(handle: &ConnectionHandle) -> Vec<String> {
        match handle.execute(queries::LIST_SCHEMAS).await {
            QueryOutcome::Success { rows, .. } => rows
                .iter()
                .filter_map(|r| r.get("schema_name").and_then(|v| v.as_str()))
                .map(String::from)
                .collect(),
            QueryOutcome::Failure { message } => {
                warn!(error = %message, "Error getting schemas");
                vec!["public".to_string()]
            }
        }
    }

    /// Table names within a schema.
    pub async fn list_tables(handle: &ConnectionHandle, schema: &str) -> Vec<String> {
        match handle.execute(&queries::list_tables_sql(schema)).await {
            QueryOutcome::Success { rows, .. } => rows
                .iter()
                .filter_map(|r| r.get("table_name").and_then(|v| v.as_str()))
                .map(String::from)
                .collect(),
            QueryOutcome::Failure { message } => {
                warn!(schema = schema, error = %message, "Error getting tables in schema");
                Vec::new()
            }
        }
    }

    /// Column metadata for one table, in ordinal position order.
    pub async fn table_columns(
        handle: &ConnectionHandle,
        schema: &str,
        table: &str,
    ) -> QueryOutcome {
        handle
            .execute(&queries::table_columns_sql(schema, table))
            .await
    }

    /// Foreign keys constraining one table.
    pub async fn foreign_keys(
        handle: &ConnectionHandle,
        schema: &str,
        table: &str,
    ) -> QueryOutcome {
        handle
            .execute(&queries::foreign_keys_sql(schema, table))
            .await
    }
}

/// Quote a string as a SQL literal (single-quote doubling).
///
/// The introspection SQL flows through the text-only execute path, so
/// caller-supplied names are embedded as quoted literals rather than bind
/// parameters.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// =============================================================================
// SQL Query Templates
// =============================================================================

mod queries {
    use super::quote_literal;

    pub const LIST_SCHEMAS: &str = "\
        SELECT schema_name::text AS schema_name \
        FROM information_schema.schemata \
        WHERE schema_name NOT IN ('pg_catalog', 'information_schema') \
        ORDER BY schema_name";

    pub fn list_tables_sql(schema: &str) -> String {
        format!(
            "SELECT table_name::text AS table_name \
             FROM information_schema.tables \
             WHERE table_schema = {} \
             ORDER BY table_name",
            quote_literal(schema)
        )
    }

    pub fn table_columns_sql(schema: &str, table: &str) -> String {
        format!(
            "SELECT column_name::text AS column_name, \
                    data_type::text AS data_type, \
                    is_nullable::text AS is_nullable, \
                    column_default::text AS column_default \
             FROM information_schema.columns \
             WHERE table_schema = {} AND table_name = {} \
             ORDER BY ordinal_position",
            quote_literal(schema),
            quote_literal(table)
        )
    }

    pub fn foreign_keys_sql(schema: &str, table: &str) -> String {
        format!(
            "SELECT kcu.column_name::text AS column_name, \
                    ccu.table_schema::text AS foreign_table_schema, \
                    ccu.table_name::text AS foreign_table_name, \
                    ccu.column_name::text AS foreign_column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name \
             JOIN information_schema.constraint_column_usage ccu \
               ON ccu.constraint_name = tc.constraint_name \
             WHERE tc.constraint_type = 'FOREIGN KEY' \
               AND tc.table_schema = {} \
               AND tc.table_name = {}",
            quote_literal(schema),
            quote_literal(table)
        )
    }
}
