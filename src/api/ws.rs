use std::time::Duration;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{self, WebSocket},
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tokio::{select, time::timeout};
use tracing::{Instrument, info, info_span, warn};

use crate::event::Event;

use super::Env;

const MAX_SEND_MILLIS: u64 = 1000;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Event { event: Event },
    Error { error: String },
}

async fn send(socket: &mut WebSocket, response: &Response) -> bool {
    let text = match serde_json::to_string(response) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            return false;
        }
    };
    matches!(
        timeout(
            Duration::from_millis(MAX_SEND_MILLIS),
            socket.send(ws::Message::Text(text.into())),
        )
        .await,
        Ok(Ok(()))
    )
}

pub async fn handle_socket(mut socket: WebSocket, env: Env) {
    let cancel_token = env.cancel_token.clone();
    let mut receiver = env.event_subscriber.subscribe();

    async move {
        info!("New WebSocket connection");
        loop {
            select! {
                _ = cancel_token.cancelled() => {
                    info!("WebSocket connection cancelled");
                    break;
                },
                result = receiver.recv() => match result {
                    Ok(event) => {
                        if !send(&mut socket, &Response::Event { event }).await {
                            warn!("Failed to send event: connection closed");
                            break;
                        }
                    }
                    Err(err) => {
                        warn!("Error receiving event: {}", err);
                        break;
                    }
                },
                option_result_message = socket.recv() => match option_result_message {
                    Some(Ok(ws::Message::Ping(data))) => {
                        if timeout(
                            Duration::from_millis(MAX_SEND_MILLIS),
                            socket.send(ws::Message::Pong(data)),
                        )
                        .await
                        .is_err()
                        {
                            warn!("Failed to send pong: connection closed");
                            break;
                        }
                    }
                    Some(Ok(ws::Message::Close(_))) => {
                        info!("Received close message");
                        break;
                    }
                    Some(Ok(_)) => {
                        let error = Response::Error {
                            error: "Requests are not supported".to_string(),
                        };
                        if !send(&mut socket, &error).await {
                            warn!("Failed to send error: connection closed");
                            break;
                        }
                    }
                    Some(Err(err)) => {
                        info!("Error receiving message: {}", err);
                        break;
                    }
                    None => break,
                }
            }
        }

        let _ = socket.send(ws::Message::Close(None)).await;
        info!("WebSocket connection closed");
    }
    .instrument(info_span!("socket"))
    .await;
}

pub async fn handler(ws: WebSocketUpgrade, State(env): State<Env>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, env))
}
