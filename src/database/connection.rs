use std::path::Path;

use anyhow::Result;
use libsql::{Builder, Connection};

use super::tables::initialize_database;

/// Milliseconds a pooled reader waits for the writer's lock before failing.
const BUSY_TIMEOUT_MILLIS: u64 = 5000;

/// Opens the ledger database, creating the journal tables on first use. The writer and
/// every pooled reader go through here so they share pragmas.
pub async fn new_connection(path: &Path) -> Result<Connection> {
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;
    conn.query(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MILLIS), ())
        .await?;
    initialize_database(&conn).await?;
    Ok(conn)
}
