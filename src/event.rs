use serde::{Deserialize, Serialize};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::block::Receipt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    Processed { height: u64, receipts: Vec<Receipt> },
}

#[derive(Debug, Clone)]
pub struct EventSubscriber {
    pub sender: broadcast::Sender<Event>,
}

impl Default for EventSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber {
    pub fn new() -> Self {
        Self {
            sender: broadcast::Sender::new(100),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn run(
        &self,
        cancel_token: CancellationToken,
        mut rx: mpsc::Receiver<Event>,
    ) -> JoinHandle<()> {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    option_event = rx.recv() => match option_event {
                        Some(event) => {
                            let _ = sender.send(event);
                        }
                        None => break,
                    },
                    _ = cancel_token.cancelled() => {
                        break;
                    }
                }
            }
        })
    }
}
