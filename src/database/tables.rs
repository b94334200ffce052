pub const CREATE_BLOCKS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS blocks (
        height INTEGER PRIMARY KEY,
        call_count INTEGER NOT NULL
    )";

pub const CREATE_RECEIPTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS receipts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        height INTEGER NOT NULL,
        call_index INTEGER NOT NULL,
        caller TEXT NOT NULL,
        function TEXT NOT NULL,
        call TEXT NOT NULL,
        result TEXT NOT NULL,
        UNIQUE (height, call_index),
        FOREIGN KEY (height) REFERENCES blocks(height) ON DELETE CASCADE
    )";

pub const CREATE_RECEIPTS_CALLER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_receipts_caller ON receipts (caller)";

pub async fn initialize_database(conn: &libsql::Connection) -> Result<(), libsql::Error> {
    conn.query("PRAGMA foreign_keys = ON;", ()).await?;
    conn.execute(CREATE_BLOCKS_TABLE, ()).await?;
    conn.execute(CREATE_RECEIPTS_TABLE, ()).await?;
    conn.execute(CREATE_RECEIPTS_CALLER_INDEX, ()).await?;
    conn.query("PRAGMA journal_mode = WAL;", ()).await?;
    conn.query("PRAGMA synchronous = NORMAL;", ()).await?;
    Ok(())
}
