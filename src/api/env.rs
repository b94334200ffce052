use tokio_util::sync::CancellationToken;

use crate::{config::Config, database, event::EventSubscriber, reactor};

#[derive(Clone)]
pub struct Env {
    pub config: Config,
    pub cancel_token: CancellationToken,
    pub reader: database::Reader,
    pub reactor: reactor::Handle,
    pub event_subscriber: EventSubscriber,
}
