use anyhow::Result;
use clap::Parser;
use stormarket::{
    api::{self, Env},
    config::Config,
    database,
    event::EventSubscriber,
    logging, reactor, stopper,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const DATABASE_FILENAME: &str = "ledger.db";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::try_parse()?;
    logging::setup(config.log_format);
    info!("Stormarket");
    info!("{:#?}", config);
    std::fs::create_dir_all(&config.data_dir)?;
    let path = config.data_dir.join(DATABASE_FILENAME);

    let cancel_token = CancellationToken::new();
    let mut handles = vec![];
    handles.push(stopper::run(cancel_token.clone())?);

    let writer = database::Writer::new(&path).await?;
    let reader = database::Reader::new(&path).await?;

    let (event_tx, event_rx) = mpsc::channel(10);
    let (reactor, reactor_handle) = reactor::run(
        config.administrator.clone(),
        cancel_token.clone(),
        writer,
        Some(event_tx),
    )
    .await?;
    handles.push(reactor_handle);

    let event_subscriber = EventSubscriber::new();
    handles.push(event_subscriber.run(cancel_token.clone(), event_rx));
    handles.push(
        api::run(Env {
            config: config.clone(),
            cancel_token: cancel_token.clone(),
            reader,
            reactor,
            event_subscriber,
        })
        .await?,
    );

    for handle in handles {
        let _ = handle.await;
    }
    info!("Exited");
    Ok(())
}
