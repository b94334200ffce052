use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    block::{Block, Call, Receipt},
    database::queries::{
        select_block_at_height, select_block_latest, select_receipts_at_height,
        select_receipts_by_caller,
    },
    market::{Contract, Dispute, FileMetadata, Listing, PlatformStats, Principal, Provider},
};

use super::{Env, error::HttpError, result::Result};

pub const MAX_CALLS_PER_BLOCK: usize = 1000;

#[derive(Debug, Serialize, Deserialize)]
pub struct Info {
    pub version: String,
    pub height: u64,
    pub administrator: Principal,
}

fn get_info(env: &Env) -> Info {
    Info {
        version: env!("CARGO_PKG_VERSION").to_string(),
        height: env.reactor.height(),
        administrator: env.reactor.snapshot().administrator().clone(),
    }
}

pub async fn get_index(State(env): State<Env>) -> Result<Info> {
    Ok(get_info(&env).into())
}

pub async fn stop(State(env): State<Env>) -> Result<Info> {
    env.cancel_token.cancel();
    Ok(get_info(&env).into())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRequest {
    pub calls: Vec<Call>,
}

pub async fn post_block(
    State(env): State<Env>,
    Json(BlockRequest { calls }): Json<BlockRequest>,
) -> Result<Block> {
    if calls.is_empty() {
        return Err(HttpError::BadRequest("block has no calls".to_string()).into());
    }
    if calls.len() > MAX_CALLS_PER_BLOCK {
        return Err(HttpError::BadRequest(format!(
            "block has {} calls, limit is {}",
            calls.len(),
            MAX_CALLS_PER_BLOCK
        ))
        .into());
    }
    let block = env
        .reactor
        .submit(calls)
        .await
        .map_err(|e| HttpError::ServiceUnavailable(e.to_string()))?;
    Ok(block.into())
}

async fn block_at_height(env: &Env, height: i64) -> anyhow::Result<Option<Block>> {
    let conn = env.reader.connection().await?;
    let Some(row) = select_block_at_height(&conn, height).await? else {
        return Ok(None);
    };
    let receipts = select_receipts_at_height(&conn, row.height)
        .await?
        .into_iter()
        .map(Receipt::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Some(Block {
        height: row.height as u64,
        receipts,
    }))
}

pub async fn get_block(State(env): State<Env>, Path(height): Path<i64>) -> Result<Block> {
    match block_at_height(&env, height).await? {
        Some(block) => Ok(block.into()),
        None => Err(HttpError::NotFound(format!("block at height: {}", height)).into()),
    }
}

pub async fn get_block_latest(State(env): State<Env>) -> Result<Block> {
    let latest = select_block_latest(&*env.reader.connection().await?).await?;
    let block = match latest {
        Some(row) => block_at_height(&env, row.height).await?,
        None => None,
    };
    match block {
        Some(block) => Ok(block.into()),
        None => Err(HttpError::NotFound("No blocks written".to_owned()).into()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub height: u64,
    #[serde(flatten)]
    pub receipt: Receipt,
}

pub async fn get_caller_receipts(
    State(env): State<Env>,
    Path(principal): Path<String>,
) -> Result<Vec<JournalEntry>> {
    let rows = select_receipts_by_caller(&*env.reader.connection().await?, &principal).await?;
    let entries = rows
        .into_iter()
        .map(|row| {
            let height = row.height as u64;
            Receipt::try_from(row).map(|receipt| JournalEntry { height, receipt })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(entries.into())
}

fn found<T>(value: Option<T>, what: String) -> Result<T>
where
    T: Serialize,
{
    match value {
        Some(value) => Ok(value.into()),
        None => Err(HttpError::NotFound(what).into()),
    }
}

pub async fn get_provider(
    State(env): State<Env>,
    Path(principal): Path<String>,
) -> Result<Provider> {
    let principal = principal
        .parse::<Principal>()
        .map_err(HttpError::BadRequest)?;
    let market = env.reactor.snapshot();
    found(
        market.get_provider_info(&principal).cloned(),
        format!("provider: {}", principal),
    )
}

pub async fn get_listing(State(env): State<Env>, Path(id): Path<u64>) -> Result<Listing> {
    found(
        env.reactor.snapshot().get_listing(id).cloned(),
        format!("listing: {}", id),
    )
}

pub async fn get_contract(State(env): State<Env>, Path(id): Path<u64>) -> Result<Contract> {
    found(
        env.reactor.snapshot().get_contract(id).cloned(),
        format!("contract: {}", id),
    )
}

pub async fn get_dispute(State(env): State<Env>, Path(id): Path<u64>) -> Result<Dispute> {
    found(
        env.reactor.snapshot().get_dispute(id).cloned(),
        format!("dispute: {}", id),
    )
}

pub async fn get_file(State(env): State<Env>, Path(id): Path<u64>) -> Result<FileMetadata> {
    found(
        env.reactor.snapshot().get_file_metadata(id).cloned(),
        format!("file: {}", id),
    )
}

pub async fn get_stats(State(env): State<Env>) -> Result<PlatformStats> {
    Ok(env.reactor.snapshot().get_platform_stats().into())
}
