use libsql::{Connection, de::from_row, params};
use serde::de::DeserializeOwned;
use thiserror::Error as ThisError;

use super::types::{BlockRow, ReceiptRow};

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("LibSQL error: {0}")]
    LibSQL(#[from] libsql::Error),
    #[error("Row deserialization error: {0}")]
    RowDeserialization(#[from] serde::de::value::Error),
}

async fn collect_rows<T: DeserializeOwned>(mut rows: libsql::Rows) -> Result<Vec<T>, Error> {
    let mut results = Vec::new();
    while let Some(row) = rows.next().await? {
        results.push(from_row(&row)?);
    }
    Ok(results)
}

pub async fn insert_block(conn: &Connection, block: BlockRow) -> Result<i64, Error> {
    conn.execute(
        "INSERT INTO blocks (height, call_count) VALUES (?, ?)",
        (block.height, block.call_count),
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

pub async fn insert_receipt(conn: &Connection, receipt: ReceiptRow) -> Result<i64, Error> {
    conn.execute(
        "INSERT INTO receipts (height, call_index, caller, function, call, result) VALUES (?, ?, ?, ?, ?, ?)",
        params![
            receipt.height,
            receipt.call_index,
            receipt.caller,
            receipt.function,
            receipt.call,
            receipt.result
        ],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

pub async fn select_block_latest(conn: &Connection) -> Result<Option<BlockRow>, Error> {
    let mut rows = conn
        .query(
            "SELECT height, call_count FROM blocks ORDER BY height DESC LIMIT 1",
            params![],
        )
        .await?;
    Ok(rows.next().await?.map(|r| from_row(&r)).transpose()?)
}

pub async fn select_block_at_height(
    conn: &Connection,
    height: i64,
) -> Result<Option<BlockRow>, Error> {
    let mut rows = conn
        .query(
            "SELECT height, call_count FROM blocks WHERE height = ?",
            params![height],
        )
        .await?;
    Ok(rows.next().await?.map(|r| from_row(&r)).transpose()?)
}

pub async fn select_receipts_at_height(
    conn: &Connection,
    height: i64,
) -> Result<Vec<ReceiptRow>, Error> {
    let rows = conn
        .query(
            "SELECT height, call_index, caller, function, call, result FROM receipts WHERE height = ? ORDER BY call_index ASC",
            params![height],
        )
        .await?;
    collect_rows(rows).await
}

pub async fn select_receipts_by_caller(
    conn: &Connection,
    caller: &str,
) -> Result<Vec<ReceiptRow>, Error> {
    let rows = conn
        .query(
            "SELECT height, call_index, caller, function, call, result FROM receipts WHERE caller = ? ORDER BY height ASC, call_index ASC",
            params![caller],
        )
        .await?;
    collect_rows(rows).await
}

/// Every journaled call in apply order.
pub async fn select_receipts_ordered(conn: &Connection) -> Result<Vec<ReceiptRow>, Error> {
    let rows = conn
        .query(
            "SELECT height, call_index, caller, function, call, result FROM receipts ORDER BY height ASC, call_index ASC",
            params![],
        )
        .await?;
    collect_rows(rows).await
}
