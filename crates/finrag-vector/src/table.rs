//! LanceDB connection and housekeeping helpers.

use anyhow::Result;
use lancedb::{connect, Connection};
use std::sync::Arc;

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

/// Create an empty table with `schema` unless one named `name` already exists.
/// Returns true when the table was created.
pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    if names.iter().any(|n| n == name) {
        return Ok(false);
    }
    conn.create_empty_table(name, schema).execute().await?;
    Ok(true)
}
