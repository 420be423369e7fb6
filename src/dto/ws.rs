//! Frames exchanged over the `/game` relay socket.
//!
//! Inbound: `{"event", "data", "ack"?}`. Broadcasts: `{"event", "data"}`.
//! Replies to the caller: `{"event": "ack", "ack"?, "data": {"success", ...}}`.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    display::DisplayStatus,
    dto::{
        game::GameView,
        round::RoundView,
        validation::{validate_entity_id, validate_not_blank},
    },
};

/// Event names on the relay wire.
pub const EVENT_JOIN: &str = "game:join";
pub const EVENT_SCORE_UPDATE: &str = "score:update";
pub const EVENT_ROUND_STATUS_UPDATE: &str = "round:status:update";
pub const EVENT_QUESTION_SELECT: &str = "round:question:select";
pub const EVENT_QUESTION_SELECTED: &str = "round:question:selected";
pub const EVENT_DISPLAY_UPDATE: &str = "display:update";
pub const EVENT_DISPLAY_CHANGE: &str = "display:change";
pub const EVENT_PLAY_SOUND: &str = "play_sound";
pub const EVENT_ACK: &str = "ack";

/// Raw inbound frame before the payload is interpreted.
#[derive(Debug, Deserialize)]
pub struct RawFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub ack: Option<u64>,
}

impl RawFrame {
    pub fn from_json_str(text: &str) -> Result<Self, FrameError> {
        serde_json::from_str(text).map_err(FrameError::Malformed)
    }
}

/// Reasons an inbound frame cannot be turned into a [`RelayRequest`].
#[derive(Debug, Error)]
pub enum FrameError {
    /// Text was not a JSON frame envelope.
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The event name is not handled by the relay.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    /// `data` did not match the event's payload shape.
    #[error("invalid `{event}` payload: {source}")]
    InvalidPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// The payload parsed but broke a validation rule.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinGame {
    #[validate(custom(function = "validate_entity_id"))]
    pub game_id: String,
}

/// Score change; absent sides keep their persisted value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    #[validate(custom(function = "validate_entity_id"))]
    pub game_id: String,
    #[serde(default)]
    pub experts_score: Option<u32>,
    #[serde(default)]
    pub viewers_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoundStatusUpdate {
    #[validate(custom(function = "validate_entity_id"))]
    pub round_id: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSelect {
    #[validate(custom(function = "validate_entity_id"))]
    pub round_id: String,
    #[validate(custom(function = "validate_entity_id"))]
    pub question_id: String,
}

/// Partial display status merged into the stored one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DisplayUpdate {
    #[validate(custom(function = "validate_entity_id"))]
    pub round_id: String,
    pub display_status: DisplayStatus,
}

fn full_volume() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaySound {
    #[validate(custom(function = "validate_entity_id"))]
    pub game_id: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub file: String,
    #[serde(default = "full_volume")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub volume: f64,
}

/// A validated inbound relay event.
#[derive(Debug, Clone)]
pub enum RelayRequest {
    Join(JoinGame),
    ScoreUpdate(ScoreUpdate),
    RoundStatusUpdate(RoundStatusUpdate),
    QuestionSelect(QuestionSelect),
    DisplayUpdate(DisplayUpdate),
    PlaySound(PlaySound),
}

fn payload<T>(event: &'static str, data: Value) -> Result<T, FrameError>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(data)
        .map_err(|source| FrameError::InvalidPayload { event, source })?;
    parsed.validate()?;
    Ok(parsed)
}

impl RelayRequest {
    /// Interpret the payload of `event` and validate it.
    pub fn parse(event: &str, data: Value) -> Result<Self, FrameError> {
        Ok(match event {
            EVENT_JOIN => Self::Join(payload(EVENT_JOIN, data)?),
            EVENT_SCORE_UPDATE => Self::ScoreUpdate(payload(EVENT_SCORE_UPDATE, data)?),
            EVENT_ROUND_STATUS_UPDATE => {
                Self::RoundStatusUpdate(payload(EVENT_ROUND_STATUS_UPDATE, data)?)
            }
            EVENT_QUESTION_SELECT => Self::QuestionSelect(payload(EVENT_QUESTION_SELECT, data)?),
            EVENT_DISPLAY_UPDATE => Self::DisplayUpdate(payload(EVENT_DISPLAY_UPDATE, data)?),
            EVENT_PLAY_SOUND => Self::PlaySound(payload(EVENT_PLAY_SOUND, data)?),
            other => return Err(FrameError::UnknownEvent(other.to_owned())),
        })
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Join(_) => EVENT_JOIN,
            Self::ScoreUpdate(_) => EVENT_SCORE_UPDATE,
            Self::RoundStatusUpdate(_) => EVENT_ROUND_STATUS_UPDATE,
            Self::QuestionSelect(_) => EVENT_QUESTION_SELECT,
            Self::DisplayUpdate(_) => EVENT_DISPLAY_UPDATE,
            Self::PlaySound(_) => EVENT_PLAY_SOUND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreChanged {
    pub game_id: String,
    pub experts_score: u32,
    pub viewers_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundStatusChanged {
    pub round_id: String,
    pub status: String,
    pub round: RoundView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSelected {
    pub round_id: String,
    pub question_id: String,
    pub round: RoundView,
}

/// Full merged display status of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayChanged {
    pub round_id: String,
    pub display_status: DisplayStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SoundCue {
    pub file: String,
    pub volume: f64,
    /// Milliseconds since the Unix epoch at emission.
    pub timestamp: i64,
}

/// Events broadcast to a game room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum RelayEvent {
    #[serde(rename = "score:update")]
    ScoreUpdate(ScoreChanged),
    #[serde(rename = "round:status:update")]
    RoundStatusUpdate(RoundStatusChanged),
    #[serde(rename = "round:question:selected")]
    QuestionSelected(QuestionSelected),
    #[serde(rename = "display:change")]
    DisplayChange(DisplayChanged),
    #[serde(rename = "play_sound")]
    PlaySound(SoundCue),
}

impl RelayEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::ScoreUpdate(_) => EVENT_SCORE_UPDATE,
            Self::RoundStatusUpdate(_) => EVENT_ROUND_STATUS_UPDATE,
            Self::QuestionSelected(_) => EVENT_QUESTION_SELECTED,
            Self::DisplayChange(_) => EVENT_DISPLAY_CHANGE,
            Self::PlaySound(_) => EVENT_PLAY_SOUND,
        }
    }
}

/// Handler-specific part of a successful reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayReply {
    Joined {
        #[serde(rename = "gameId")]
        game_id: String,
    },
    Game {
        game: GameView,
    },
    Round {
        round: RoundView,
    },
    Display {
        #[serde(rename = "displayStatus")]
        display_status: DisplayStatus,
    },
    Sound {
        file: String,
        volume: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AckBody {
    pub success: bool,
    #[serde(flatten)]
    pub reply: Option<RelayReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply sent to the caller only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AckFrame {
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
    pub data: AckBody,
}

impl AckFrame {
    pub fn success(ack: Option<u64>, reply: RelayReply) -> Self {
        Self {
            event: EVENT_ACK,
            ack,
            data: AckBody {
                success: true,
                reply: Some(reply),
                error: None,
            },
        }
    }

    pub fn failure(ack: Option<u64>, error: impl Into<String>) -> Self {
        Self {
            event: EVENT_ACK,
            ack,
            data: AckBody {
                success: false,
                reply: None,
                error: Some(error.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn play_sound_defaults_to_full_volume() {
        let request =
            RelayRequest::parse(EVENT_PLAY_SOUND, json!({"gameId": "g1", "file": "gong.mp3"}))
                .unwrap();
        let RelayRequest::PlaySound(sound) = request else {
            panic!("expected a play_sound request");
        };
        assert_eq!(sound.volume, 1.0);
    }

    #[test]
    fn unknown_events_are_rejected() {
        let err = RelayRequest::parse("buzz", json!({})).unwrap_err();
        assert!(matches!(err, FrameError::UnknownEvent(name) if name == "buzz"));
    }

    #[test]
    fn payload_missing_required_field_is_invalid() {
        let err = RelayRequest::parse(EVENT_DISPLAY_UPDATE, json!({"roundId": "r1"})).unwrap_err();
        assert!(matches!(err, FrameError::InvalidPayload { event, .. } if event == EVENT_DISPLAY_UPDATE));
    }

    #[test]
    fn out_of_range_volume_fails_validation() {
        let err = RelayRequest::parse(
            EVENT_PLAY_SOUND,
            json!({"gameId": "g1", "file": "gong.mp3", "volume": 3.0}),
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::Validation(_)));
    }

    #[test]
    fn frames_without_ack_or_data_still_parse() {
        let frame = RawFrame::from_json_str(r#"{"event": "game:join"}"#).unwrap();
        assert_eq!(frame.ack, None);
        assert!(frame.data.is_null());
    }

    #[test]
    fn broadcasts_use_event_and_data_envelope() {
        let event = RelayEvent::ScoreUpdate(ScoreChanged {
            game_id: "g1".into(),
            experts_score: 5,
            viewers_score: 2,
        });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "score:update", "data": {"gameId": "g1", "expertsScore": 5, "viewersScore": 2}})
        );
    }

    #[test]
    fn replies_flatten_the_handler_payload() {
        let ok = AckFrame::success(Some(7), RelayReply::Joined { game_id: "g1".into() });
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"event": "ack", "ack": 7, "data": {"success": true, "gameId": "g1"}})
        );

        let failed = AckFrame::failure(None, "not found: Round with ID r9 not found");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"event": "ack", "data": {"success": false, "error": "not found: Round with ID r9 not found"}})
        );
    }
}
