use axum::extract::ws::{Message, WebSocket};
use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    services::relay_service::{self, RelayClient},
    state::SharedState,
};

/// Handle the full lifecycle of one relay WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (sender, mut receiver) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Broadcasts from other connections land in this channel while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        let _ = UnboundedReceiverStream::new(outbound_rx)
            .map(Ok)
            .forward(sender)
            .await;
    });

    let mut client = RelayClient::new(outbound_tx.clone());
    info!(connection = %client.id(), "relay client connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                debug!(connection = %client.id(), payload = %text, "received relay frame");
                if let Some(reply) = relay_service::handle_text(&state, &mut client, text.as_str()).await {
                    match serde_json::to_string(&reply) {
                        Ok(payload) => {
                            if outbound_tx.send(Message::Text(payload.into())).is_err() {
                                info!(connection = %client.id(), "writer closed, terminating");
                                break;
                            }
                        }
                        Err(err) => warn!(error = %err, "failed to serialize relay reply"),
                    }
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(connection = %client.id(), "relay client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {
                warn!(connection = %client.id(), "ignoring binary relay frame");
            }
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(connection = %client.id(), error = %err, "websocket error");
                break;
            }
        }
    }

    client.leave_all(&state);
    info!(connection = %client.id(), "relay client disconnected");

    // The client holds a sender clone too; drop it so the writer can drain and stop.
    drop(client);
    finalize(writer_task, outbound_tx).await;
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
