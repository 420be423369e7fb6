use futures::{SinkExt, StreamExt};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};
use tracing::{debug, warn};

use crate::dto::ws::{EVENT_ACK, EVENT_JOIN, RelayEvent};

/// Errors raised by a [`RelayConnection`].
#[derive(Debug, Error)]
pub enum RelayConnectionError {
    /// The WebSocket handshake failed.
    #[error("failed to connect to relay at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
    /// Reading from or writing to the open socket failed.
    #[error("relay socket error: {0}")]
    Socket(#[from] tungstenite::Error),
    /// An outgoing frame could not be serialised.
    #[error("failed to encode relay frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A TV's WebSocket connection to the relay. Owned by the caller; dropping it closes the socket.
pub struct RelayConnection {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl RelayConnection {
    /// Open a WebSocket to the relay endpoint, e.g. `ws://localhost:8080/game`.
    pub async fn connect(url: &str) -> Result<Self, RelayConnectionError> {
        let (stream, _response) =
            connect_async(url)
                .await
                .map_err(|source| RelayConnectionError::Connect {
                    url: url.to_owned(),
                    source,
                })?;
        debug!(url, "connected to relay");
        Ok(Self {
            url: url.to_owned(),
            stream,
        })
    }

    /// Relay endpoint this connection was opened to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Join the room of `game_id`.
    pub async fn join(&mut self, game_id: &str) -> Result<(), RelayConnectionError> {
        let frame = json!({ "event": EVENT_JOIN, "data": { "gameId": game_id } });
        self.stream
            .send(Message::text(serde_json::to_string(&frame)?))
            .await?;
        Ok(())
    }

    /// Next broadcast from the room, or `None` once the relay closed the socket.
    ///
    /// Replies and events a TV has no use for are skipped.
    pub async fn next_event(&mut self) -> Result<Option<RelayEvent>, RelayConnectionError> {
        while let Some(message) = self.stream.next().await {
            match message? {
                Message::Text(text) => match serde_json::from_str::<RelayEvent>(text.as_str()) {
                    Ok(event) => return Ok(Some(event)),
                    Err(err) => {
                        if text.as_str().contains(EVENT_ACK) {
                            debug!(payload = %text.as_str(), "relay reply");
                        } else {
                            warn!(error = %err, payload = %text.as_str(), "skipping unrecognised relay frame");
                        }
                    }
                },
                Message::Close(frame) => {
                    debug!(?frame, "relay closed the connection");
                    return Ok(None);
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// Send a close frame and wait for the handshake to finish.
    pub async fn close(mut self) -> Result<(), RelayConnectionError> {
        self.stream.close(None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::{net::TcpListener, time::timeout};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::show_store::MemoryShowStore,
        dto::ws::SoundCue,
        state::AppState,
        tv::spawn_backend,
    };

    #[tokio::test]
    async fn refused_connection_names_the_url() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/game", listener.local_addr().unwrap());
        drop(listener);

        match RelayConnection::connect(&url).await {
            Err(RelayConnectionError::Connect { url: failed, .. }) => assert_eq!(failed, url),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connected to a closed port"),
        }
    }

    #[tokio::test]
    async fn replies_are_skipped_until_a_broadcast_arrives() {
        let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryShowStore::new()));
        let url = format!("ws://{}/game", spawn_backend(state).await);
        let mut tv = RelayConnection::connect(&url).await.unwrap();
        assert_eq!(tv.url(), url);

        // Acked join, then a sound: the ack reply must not surface as an event.
        let join = json!({ "event": EVENT_JOIN, "data": { "gameId": "g1" }, "ack": 1 });
        tv.stream
            .send(Message::text(join.to_string()))
            .await
            .unwrap();
        let sound = json!({ "event": "play_sound", "data": { "gameId": "g1", "file": "gong.mp3" } });
        tv.stream
            .send(Message::text(sound.to_string()))
            .await
            .unwrap();

        let event = timeout(Duration::from_secs(5), tv.next_event())
            .await
            .unwrap()
            .unwrap();
        match event {
            Some(RelayEvent::PlaySound(SoundCue { file, volume, .. })) => {
                assert_eq!(file, "gong.mp3");
                assert_eq!(volume, 1.0);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        tv.close().await.unwrap();
    }
}
