use anyhow::Result;
use tempfile::TempDir;

use crate::{
    block::{Call, Op},
    database::{Reader, Writer},
    market::Principal,
};

pub async fn new_test_db() -> Result<(Reader, Writer, TempDir)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("test_ledger.db");
    let writer = Writer::new(&path).await?;
    let reader = Reader::new(&path).await?;
    Ok((reader, writer, temp_dir))
}

pub fn administrator() -> Principal {
    Principal::new("deployer")
}

pub fn provider() -> Principal {
    Principal::new("wallet_1")
}

pub fn buyer() -> Principal {
    Principal::new("wallet_2")
}

pub fn stranger() -> Principal {
    Principal::new("wallet_3")
}

/// Register, list, purchase: leaves provider 1 with listing 1 and contract 1.
pub fn purchase_flow() -> Vec<Call> {
    vec![
        Call::new(
            &provider(),
            Op::RegisterProvider {
                total_space: 1000,
                price_per_gb: 10,
            },
        ),
        Call::new(
            &provider(),
            Op::CreateListing {
                space_gb: 500,
                price_per_gb: 15,
                duration_days: 30,
            },
        ),
        Call::new(
            &buyer(),
            Op::PurchaseStorage {
                listing_id: 1,
                space_gb: 100,
            },
        ),
    ]
}
