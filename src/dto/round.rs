use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{RoundEntity, RoundStatus},
    display::DisplayStatus,
    dto::{
        format_optional_time, format_system_time,
        validation::{validate_entity_id, validate_not_blank},
    },
};

/// Public projection of a round, also embedded in relay broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoundView {
    pub id: String,
    pub game_id: String,
    pub question_id: Option<String>,
    pub round_number: u32,
    pub is_answered_correctly: bool,
    pub experts_answer: Option<String>,
    pub time_started: Option<String>,
    pub time_answered: Option<String>,
    pub time_limit_seconds: u32,
    pub display_status: DisplayStatus,
    #[schema(value_type = String, example = "question_shown")]
    pub status: RoundStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RoundEntity> for RoundView {
    fn from(round: RoundEntity) -> Self {
        Self {
            id: round.id,
            game_id: round.game_id,
            question_id: round.question_id,
            round_number: round.round_number,
            is_answered_correctly: round.is_answered_correctly,
            experts_answer: round.experts_answer,
            time_started: format_optional_time(round.time_started),
            time_answered: format_optional_time(round.time_answered),
            time_limit_seconds: round.time_limit_seconds,
            display_status: round.display_status,
            status: round.status,
            created_at: format_system_time(round.created_at),
            updated_at: format_system_time(round.updated_at),
        }
    }
}

/// Payload used to open a round in a game.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateRoundRequest {
    #[validate(custom(function = "validate_entity_id"))]
    pub game_id: String,
    #[validate(range(min = 1))]
    pub round_number: u32,
    #[serde(default)]
    #[validate(custom(function = "validate_entity_id"))]
    pub question_id: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 3600))]
    pub time_limit_seconds: Option<u32>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub status: Option<RoundStatus>,
    #[serde(default)]
    pub display_status: Option<DisplayStatus>,
}

impl CreateRoundRequest {
    pub fn into_entity(self, id: String) -> RoundEntity {
        let mut round = RoundEntity::new(id, self.game_id, self.round_number);
        round.question_id = self.question_id;
        if let Some(limit) = self.time_limit_seconds {
            round.time_limit_seconds = limit;
        }
        if let Some(status) = self.status {
            round.status = status;
        }
        if let Some(display_status) = self.display_status {
            round.display_status = display_status;
        }
        round
    }
}

/// Partial update of a round; absent fields keep their stored value.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateRoundRequest {
    #[validate(custom(function = "validate_entity_id"))]
    pub question_id: Option<String>,
    #[validate(range(min = 1))]
    pub round_number: Option<u32>,
    pub is_answered_correctly: Option<bool>,
    pub experts_answer: Option<String>,
    #[validate(range(min = 1, max = 3600))]
    pub time_limit_seconds: Option<u32>,
    #[schema(value_type = Option<String>)]
    pub status: Option<RoundStatus>,
    /// Stamp `time_started` with the current time.
    pub mark_started: Option<bool>,
    /// Stamp `time_answered` with the current time.
    pub mark_answered: Option<bool>,
}

impl UpdateRoundRequest {
    pub fn apply_to(self, round: &mut RoundEntity) {
        let now = SystemTime::now();
        if let Some(question_id) = self.question_id {
            round.question_id = Some(question_id);
        }
        if let Some(number) = self.round_number {
            round.round_number = number;
        }
        if let Some(correct) = self.is_answered_correctly {
            round.is_answered_correctly = correct;
        }
        if let Some(answer) = self.experts_answer {
            round.experts_answer = Some(answer);
        }
        if let Some(limit) = self.time_limit_seconds {
            round.time_limit_seconds = limit;
        }
        if let Some(status) = self.status {
            round.status = status;
        }
        if self.mark_started == Some(true) {
            round.time_started = Some(now);
        }
        if self.mark_answered == Some(true) {
            round.time_answered = Some(now);
        }
    }
}

/// Request to change only the status of a round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RoundStatusRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub status: String,
}
