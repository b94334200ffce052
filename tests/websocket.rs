use std::time::Duration;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use stormarket::{
    api::{self, Env, ws::Response},
    config::Config,
    event::{Event, EventSubscriber},
    reactor,
    test_utils::{administrator, new_test_db, purchase_flow},
};
use tokio::{sync::mpsc, time::sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_websocket_streams_events() -> Result<()> {
    let cancel_token = CancellationToken::new();
    let (reader, writer, temp_dir) = new_test_db().await?;
    let mut config = Config::new_na(temp_dir.path().to_path_buf());
    config.api_port = 19444;

    let (event_tx, event_rx) = mpsc::channel(10);
    let (reactor, reactor_handle) =
        reactor::run(administrator(), cancel_token.clone(), writer, Some(event_tx)).await?;
    let event_subscriber = EventSubscriber::new();
    let mut handles = vec![reactor_handle];
    handles.push(event_subscriber.run(cancel_token.clone(), event_rx));
    handles.push(
        api::run(Env {
            config: config.clone(),
            cancel_token: cancel_token.clone(),
            reader,
            reactor: reactor.clone(),
            event_subscriber,
        })
        .await?,
    );

    let url = format!("ws://127.0.0.1:{}/ws", config.api_port);
    let mut attempts = 0;
    let (mut ws_stream, _) = loop {
        match connect_async(url.as_str()).await {
            Ok(connected) => break connected,
            Err(_) if attempts < 50 => {
                attempts += 1;
                sleep(Duration::from_millis(20)).await;
            }
            Err(e) => return Err(e.into()),
        }
    };

    let ping_data = vec![1, 2, 3];
    ws_stream
        .send(Message::Ping(ping_data.clone().into()))
        .await?;
    let received = ws_stream.next().await.unwrap()?;
    assert_eq!(received, Message::Pong(ping_data.into()));

    let block = reactor.submit(purchase_flow()).await?;
    let message = ws_stream.next().await.unwrap()?;
    let response: Response = serde_json::from_str(message.to_text()?)?;
    assert_eq!(
        response,
        Response::Event {
            event: Event::Processed {
                height: 1,
                receipts: block.receipts,
            }
        }
    );

    ws_stream.send(Message::Text("hello".into())).await?;
    let message = ws_stream.next().await.unwrap()?;
    let response: Response = serde_json::from_str(message.to_text()?)?;
    assert!(matches!(response, Response::Error { .. }));

    ws_stream.send(Message::Close(None)).await?;
    let close_msg = ws_stream.next().await.unwrap()?;
    assert!(close_msg.is_close());

    cancel_token.cancel();
    for handle in handles {
        let _ = handle.await;
    }
    Ok(())
}
