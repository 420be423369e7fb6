use std::{
    collections::HashSet,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::extract::ws::Message;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{
        AckFrame, DisplayChanged, FrameError, QuestionSelected, RawFrame, RelayEvent,
        RelayReply, RelayRequest, RoundStatusChanged, ScoreChanged, SoundCue,
    },
    error::ServiceError,
    services::{game_service, round_service},
    state::{SharedState, rooms::ConnectionId},
};

/// Reasons a relay frame could not be handled.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The frame or its payload was rejected.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Persisting the change failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The broadcast could not be serialised.
    #[error("failed to encode broadcast: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One relay socket: its writer channel and the rooms it joined.
pub struct RelayClient {
    id: ConnectionId,
    tx: UnboundedSender<Message>,
    rooms: HashSet<String>,
}

impl RelayClient {
    /// New connection with a fresh id that has joined no room yet.
    pub fn new(tx: UnboundedSender<Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
            rooms: HashSet::new(),
        }
    }

    /// Connection id used as the room member key.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Rooms joined so far.
    pub fn joined_rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(String::as_str)
    }

    /// Remove the connection from every room it joined.
    pub fn leave_all(&mut self, state: &SharedState) {
        for room in self.rooms.drain() {
            state.rooms().leave(&room, self.id);
            debug!(connection = %self.id, room = %room, "left room");
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

fn broadcast(state: &SharedState, room: &str, event: &RelayEvent) -> Result<usize, RelayError> {
    let text = serde_json::to_string(event)?;
    let delivered = state.rooms().broadcast(room, &Message::Text(text.into()));
    debug!(room, event = event.event_name(), delivered, "broadcast relay event");
    Ok(delivered)
}

/// Handle one inbound text frame. Returns the reply owed to the caller, if any.
pub async fn handle_text(
    state: &SharedState,
    client: &mut RelayClient,
    text: &str,
) -> Option<AckFrame> {
    let frame = match RawFrame::from_json_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(connection = %client.id, error = %err, "rejecting relay frame");
            return Some(AckFrame::failure(None, err.to_string()));
        }
    };

    let ack = frame.ack;
    let event = frame.event.clone();
    let outcome = match RelayRequest::parse(&frame.event, frame.data) {
        Ok(request) => dispatch(state, client, request).await,
        Err(err) => Err(err.into()),
    };

    match outcome {
        Ok(reply) => ack.map(|ack| AckFrame::success(Some(ack), reply)),
        Err(err) => {
            warn!(connection = %client.id, event = %event, error = %err, "relay event failed");
            Some(AckFrame::failure(ack, err.to_string()))
        }
    }
}

async fn dispatch(
    state: &SharedState,
    client: &mut RelayClient,
    request: RelayRequest,
) -> Result<RelayReply, RelayError> {
    match request {
        RelayRequest::Join(join) => {
            let added = state
                .rooms()
                .join(&join.game_id, client.id, client.tx.clone());
            client.rooms.insert(join.game_id.clone());
            info!(connection = %client.id, room = %join.game_id, added, "joined game room");
            Ok(RelayReply::Joined {
                game_id: join.game_id,
            })
        }
        RelayRequest::ScoreUpdate(update) => {
            let game = game_service::update_score(
                state,
                &update.game_id,
                update.experts_score,
                update.viewers_score,
            )
            .await?;
            info!(
                game_id = %game.id,
                experts = game.experts_score,
                viewers = game.viewers_score,
                "score updated"
            );
            broadcast(
                state,
                &game.id,
                &RelayEvent::ScoreUpdate(ScoreChanged {
                    game_id: game.id.clone(),
                    experts_score: game.experts_score,
                    viewers_score: game.viewers_score,
                }),
            )?;
            Ok(RelayReply::Game { game })
        }
        RelayRequest::RoundStatusUpdate(update) => {
            let round = round_service::update_status(state, &update.round_id, update.status).await?;
            info!(round_id = %round.id, status = %round.status, "round status updated");
            broadcast(
                state,
                &round.game_id,
                &RelayEvent::RoundStatusUpdate(RoundStatusChanged {
                    round_id: round.id.clone(),
                    status: round.status.to_string(),
                    round: round.clone(),
                }),
            )?;
            Ok(RelayReply::Round { round })
        }
        RelayRequest::QuestionSelect(select) => {
            let round =
                round_service::select_question(state, &select.round_id, select.question_id.clone())
                    .await?;
            info!(round_id = %round.id, question_id = %select.question_id, "question selected");
            broadcast(
                state,
                &round.game_id,
                &RelayEvent::QuestionSelected(QuestionSelected {
                    round_id: round.id.clone(),
                    question_id: select.question_id,
                    round: round.clone(),
                }),
            )?;
            Ok(RelayReply::Round { round })
        }
        RelayRequest::DisplayUpdate(update) => {
            let round =
                round_service::merge_display_status(state, &update.round_id, update.display_status)
                    .await?;
            info!(round_id = %round.id, "display status updated");
            broadcast(
                state,
                &round.game_id,
                &RelayEvent::DisplayChange(DisplayChanged {
                    round_id: round.id.clone(),
                    display_status: round.display_status.clone(),
                }),
            )?;
            Ok(RelayReply::Display {
                display_status: round.display_status,
            })
        }
        RelayRequest::PlaySound(sound) => {
            info!(game_id = %sound.game_id, file = %sound.file, volume = sound.volume, "playing sound");
            broadcast(
                state,
                &sound.game_id,
                &RelayEvent::PlaySound(SoundCue {
                    file: sound.file.clone(),
                    volume: sound.volume,
                    timestamp: now_millis(),
                }),
            )?;
            Ok(RelayReply::Sound {
                file: sound.file,
                volume: sound.volume,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{GameEntity, RoundEntity},
            show_store::{MemoryShowStore, ShowStore},
        },
        state::AppState,
    };

    async fn seeded_state() -> SharedState {
        let store = MemoryShowStore::new();
        let mut game = GameEntity::new("g1".into());
        game.viewers_score = 4;
        store.save_game(game).await.unwrap();
        store
            .save_round(RoundEntity::new("r1".into(), "g1".into(), 1))
            .await
            .unwrap();
        AppState::with_store(AppConfig::default(), Arc::new(store))
    }

    fn client() -> (RelayClient, UnboundedReceiver<Message>) {
        let (tx, rx) = unbounded_channel();
        (RelayClient::new(tx), rx)
    }

    fn frame(event: &str, data: Value) -> String {
        json!({ "event": event, "data": data }).to_string()
    }

    fn next_json(rx: &mut UnboundedReceiver<Message>) -> Value {
        match rx.try_recv() {
            Ok(Message::Text(text)) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn score_update_broadcasts_the_persisted_score() {
        let state = seeded_state().await;
        let (mut operator, mut rx) = client();
        handle_text(&state, &mut operator, &frame("game:join", json!({"gameId": "g1"}))).await;

        let reply = handle_text(
            &state,
            &mut operator,
            &frame("score:update", json!({"gameId": "g1", "expertsScore": 5})),
        )
        .await;

        assert!(reply.is_none());
        assert_eq!(
            next_json(&mut rx),
            json!({"event": "score:update", "data": {"gameId": "g1", "expertsScore": 5, "viewersScore": 4}})
        );
    }

    #[tokio::test]
    async fn display_merges_accumulate_across_updates() {
        let state = seeded_state().await;
        let (mut tv, mut rx) = client();
        handle_text(&state, &mut tv, &frame("game:join", json!({"gameId": "g1"}))).await;

        handle_text(
            &state,
            &mut tv,
            &frame(
                "display:update",
                json!({"roundId": "r1", "displayStatus": {"content": "question", "show_timer": true, "timer_seconds": 60}}),
            ),
        )
        .await;
        handle_text(
            &state,
            &mut tv,
            &frame(
                "display:update",
                json!({"roundId": "r1", "displayStatus": {"show_timer": false}}),
            ),
        )
        .await;

        let _first = next_json(&mut rx);
        let second = next_json(&mut rx);
        assert_eq!(second["event"], "display:change");
        assert_eq!(
            second["data"]["displayStatus"],
            json!({"content": "question", "show_timer": false, "timer_seconds": 60})
        );
    }

    #[tokio::test]
    async fn play_sound_to_an_empty_room_succeeds() {
        let state = seeded_state().await;
        let (mut operator, _rx) = client();

        let reply = handle_text(
            &state,
            &mut operator,
            &json!({"event": "play_sound", "data": {"gameId": "nobody", "file": "gong.mp3"}, "ack": 3})
                .to_string(),
        )
        .await
        .unwrap();

        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"event": "ack", "ack": 3, "data": {"success": true, "file": "gong.mp3", "volume": 1.0}})
        );
    }

    #[tokio::test]
    async fn joining_twice_delivers_each_broadcast_once() {
        let state = seeded_state().await;
        let (mut tv, mut rx) = client();
        for _ in 0..2 {
            handle_text(&state, &mut tv, &frame("game:join", json!({"gameId": "g1"}))).await;
        }

        handle_text(
            &state,
            &mut tv,
            &frame("play_sound", json!({"gameId": "g1", "file": "gong.mp3", "volume": 0.5})),
        )
        .await;

        assert_eq!(next_json(&mut rx)["data"]["volume"], json!(0.5));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failures_are_replied_to_the_caller_and_not_broadcast() {
        let state = seeded_state().await;
        let (mut operator, mut rx) = client();
        handle_text(&state, &mut operator, &frame("game:join", json!({"gameId": "g1"}))).await;

        let reply = handle_text(
            &state,
            &mut operator,
            &frame("round:status:update", json!({"roundId": "r404", "status": "thinking"})),
        )
        .await
        .unwrap();

        assert!(!reply.data.success);
        assert!(reply.data.error.unwrap().contains("Round with ID r404 not found"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_frames_get_a_failure_reply() {
        let state = seeded_state().await;
        let (mut operator, _rx) = client();
        let reply = handle_text(&state, &mut operator, "not json").await.unwrap();
        assert!(!reply.data.success);
    }

    #[tokio::test]
    async fn leaving_all_rooms_stops_delivery() {
        let state = seeded_state().await;
        let (mut tv, _rx) = client();
        handle_text(&state, &mut tv, &frame("game:join", json!({"gameId": "g1"}))).await;
        assert_eq!(state.rooms().member_count("g1"), 1);

        tv.leave_all(&state);

        assert_eq!(state.rooms().member_count("g1"), 0);
        assert_eq!(tv.joined_rooms().count(), 0);
    }
}
