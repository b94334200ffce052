use std::path::Path;

use anyhow::Result;
use libsql::Connection;

use crate::block::Block;

use super::{
    connection::new_connection,
    queries::{insert_block, insert_receipt},
    types::{BlockRow, ReceiptRow},
};

#[derive(Clone)]
pub struct Writer {
    conn: Connection,
}

impl Writer {
    pub async fn new(path: &Path) -> Result<Self> {
        let conn = new_connection(path).await?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> Connection {
        self.conn.clone()
    }

    /// Journals a block and all of its receipts in one transaction.
    pub async fn write_block(&self, block: &Block) -> Result<()> {
        let tx = self.conn.transaction().await?;
        insert_block(&tx, BlockRow::from(block)).await?;
        for receipt in &block.receipts {
            insert_receipt(&tx, ReceiptRow::try_from_receipt(block.height, receipt)?).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
