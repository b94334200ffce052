use anyhow::Result;
use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::block::{Block, Call, Receipt, ReceiptResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct BlockRow {
    pub height: i64,
    #[builder(default = 0)]
    pub call_count: i64,
}

impl From<&Block> for BlockRow {
    fn from(b: &Block) -> Self {
        BlockRow {
            height: b.height as i64,
            call_count: b.receipts.len() as i64,
        }
    }
}

/// A journaled call. `call` and `result` hold the JSON encodings of [`Call`] and
/// [`ReceiptResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ReceiptRow {
    pub height: i64,
    pub call_index: i64,
    pub caller: String,
    pub function: String,
    pub call: String,
    pub result: String,
}

impl ReceiptRow {
    pub fn try_from_receipt(height: u64, receipt: &Receipt) -> Result<Self> {
        Ok(ReceiptRow::builder()
            .height(height as i64)
            .call_index(receipt.call_index as i64)
            .caller(receipt.call.caller.to_string())
            .function(receipt.call.op.function_name().to_string())
            .call(serde_json::to_string(&receipt.call)?)
            .result(serde_json::to_string(&receipt.result)?)
            .build())
    }

    pub fn to_call(&self) -> Result<Call> {
        Ok(serde_json::from_str(&self.call)?)
    }
}

impl TryFrom<ReceiptRow> for Receipt {
    type Error = anyhow::Error;

    fn try_from(row: ReceiptRow) -> Result<Self> {
        Ok(Receipt {
            call_index: row.call_index as u64,
            call: row.to_call()?,
            result: serde_json::from_str::<ReceiptResult>(&row.result)?,
        })
    }
}
