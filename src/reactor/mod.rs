use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use tokio::{
    select,
    sync::{
        mpsc::{self, Receiver},
        oneshot, watch,
    },
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    block::{Block, Call, ReceiptResult, apply_calls},
    database::{
        self,
        queries::{select_block_latest, select_receipts_ordered},
    },
    event::Event,
    market::{Market, Principal},
};

pub type Submission = (Vec<Call>, oneshot::Sender<Result<Block>>);

/// Client side of the reactor: submits blocks and reads committed snapshots.
#[derive(Clone)]
pub struct Handle {
    submit_tx: mpsc::Sender<Submission>,
    snapshot_rx: watch::Receiver<Arc<Market>>,
    height_rx: watch::Receiver<u64>,
}

impl Handle {
    pub async fn submit(&self, calls: Vec<Call>) -> Result<Block> {
        let (ret_tx, ret_rx) = oneshot::channel();
        self.submit_tx
            .send((calls, ret_tx))
            .await
            .map_err(|_| anyhow!("Reactor is not running"))?;
        ret_rx
            .await
            .map_err(|_| anyhow!("Reactor dropped the submission"))?
    }

    /// Ledger state as of the last committed block.
    pub fn snapshot(&self) -> Arc<Market> {
        self.snapshot_rx.borrow().clone()
    }

    pub fn height(&self) -> u64 {
        *self.height_rx.borrow()
    }
}

struct Reactor {
    writer: database::Writer,
    cancel_token: CancellationToken,
    submit_rx: Receiver<Submission>,
    snapshot_tx: watch::Sender<Arc<Market>>,
    height_tx: watch::Sender<u64>,
    event_tx: Option<mpsc::Sender<Event>>,

    market: Arc<Market>,
    last_height: u64,
}

/// Rebuilds the ledger by re-applying every journaled call in order.
pub async fn replay(conn: &libsql::Connection, administrator: Principal) -> Result<(Market, u64)> {
    let mut market = Market::new(administrator);
    let rows = select_receipts_ordered(conn).await?;
    let count = rows.len();
    for row in rows {
        let call = row.to_call()?;
        let result = call.apply(&mut market);
        let journaled: ReceiptResult = serde_json::from_str(&row.result)?;
        if result != journaled {
            bail!(
                "Journal diverged at height {} call {}: expected {:?}, got {:?}",
                row.height,
                row.call_index,
                journaled,
                result
            );
        }
    }
    let last_height = select_block_latest(conn)
        .await?
        .map_or(0, |b| b.height as u64);
    info!("Replayed {} calls up to height {}", count, last_height);
    Ok((market, last_height))
}

impl Reactor {
    fn handle_calls(&mut self, calls: Vec<Call>) -> Block {
        let height = self.last_height + 1;
        let mut next = (*self.market).clone();
        let block = apply_calls(&mut next, height, calls);
        for receipt in &block.receipts {
            if let Some(e) = receipt.result.error() {
                warn!(
                    "Call {}:{} {} by {} failed: {}",
                    height,
                    receipt.call_index,
                    receipt.call.op.function_name(),
                    receipt.call.caller,
                    e
                );
            }
        }
        self.market = Arc::new(next);
        block
    }

    async fn handle_submission(&mut self, calls: Vec<Call>) -> Result<Block> {
        let previous = self.market.clone();
        let block = self.handle_calls(calls);
        if let Err(e) = self.writer.write_block(&block).await {
            self.market = previous;
            return Err(e);
        }
        self.last_height = block.height;
        self.snapshot_tx.send_replace(self.market.clone());
        self.height_tx.send_replace(self.last_height);

        if let Some(tx) = &self.event_tx {
            let _ = tx
                .send(Event::Processed {
                    height: block.height,
                    receipts: block.receipts.clone(),
                })
                .await;
        }
        info!(
            "Block {} processed ({} calls)",
            block.height,
            block.receipts.len()
        );
        Ok(block)
    }

    async fn run(&mut self) {
        loop {
            select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    info!("Cancelled");
                    break;
                }
                option_submission = self.submit_rx.recv() => {
                    match option_submission {
                        Some((calls, ret_tx)) => {
                            let result = self.handle_submission(calls).await;
                            if let Err(e) = &result {
                                error!("Failed to commit block {}: {}", self.last_height + 1, e);
                            }
                            let _ = ret_tx.send(result);
                        }
                        None => {
                            info!("Received None submission, exiting");
                            break;
                        }
                    }
                }
            }
        }

        self.submit_rx.close();
        while let Some((_, ret_tx)) = self.submit_rx.recv().await {
            let _ = ret_tx.send(Err(anyhow!("Reactor is shutting down")));
        }
    }
}

/// Replays the journal and spawns the single writer. All mutations go through the
/// returned handle and are applied one block at a time.
pub async fn run(
    administrator: Principal,
    cancel_token: CancellationToken,
    writer: database::Writer,
    event_tx: Option<mpsc::Sender<Event>>,
) -> Result<(Handle, JoinHandle<()>)> {
    let (market, last_height) = replay(&writer.connection(), administrator).await?;
    let market = Arc::new(market);
    let (submit_tx, submit_rx) = mpsc::channel(100);
    let (snapshot_tx, snapshot_rx) = watch::channel(market.clone());
    let (height_tx, height_rx) = watch::channel(last_height);
    let mut reactor = Reactor {
        writer,
        cancel_token,
        submit_rx,
        snapshot_tx,
        height_tx,
        event_tx,
        market,
        last_height,
    };
    let handle = Handle {
        submit_tx,
        snapshot_rx,
        height_rx,
    };
    Ok((
        handle,
        tokio::spawn(async move {
            reactor.run().await;
            info!("Exited");
        }),
    ))
}
