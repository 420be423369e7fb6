use serde::{Deserialize, Serialize};
use std::{fmt, time::SystemTime};
use uuid::Uuid;

use crate::{dao::storage::RecordKind, display::DisplayStatus};

/// Default number of rounds in a game.
pub const DEFAULT_MAX_ROUNDS: u32 = 13;
/// Default thinking time per round.
pub const DEFAULT_TIME_LIMIT_SECONDS: u32 = 60;

/// Allocate a fresh record identifier.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Pending,
    Active,
    Finished,
}

/// Round status. The vocabulary is open: unknown strings are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoundStatus {
    #[default]
    Pending,
    QuestionShown,
    Thinking,
    Finished,
    Other(String),
}

impl RoundStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::QuestionShown => "question_shown",
            Self::Thinking => "thinking",
            Self::Finished => "finished",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for RoundStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "question_shown" => Self::QuestionShown,
            "thinking" => Self::Thinking,
            "finished" => Self::Finished,
            _ => Self::Other(value),
        }
    }
}

impl From<RoundStatus> for String {
    fn from(value: RoundStatus) -> Self {
        match value {
            RoundStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a question in the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    #[default]
    Pending,
    Used,
    Deferred,
}

/// A game (one broadcast episode) with its running score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: String,
    pub start_time: Option<SystemTime>,
    pub end_time: Option<SystemTime>,
    /// Points scored by the experts' table.
    pub experts_score: u32,
    /// Points scored by the viewers.
    pub viewers_score: u32,
    pub status: GameStatus,
    pub current_round_number: u32,
    pub max_rounds: u32,
    /// Air date (`YYYY-MM-DD`).
    pub game_date: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// Fresh pending game with zero scores.
    pub fn new(id: String) -> Self {
        let now = SystemTime::now();
        Self {
            id,
            start_time: None,
            end_time: None,
            experts_score: 0,
            viewers_score: 0,
            status: GameStatus::Pending,
            current_round_number: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            game_date: None,
            season_number: None,
            episode_number: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A round of a game, carrying the TV display status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundEntity {
    pub id: String,
    /// Owning game; also the relay room the round broadcasts to.
    pub game_id: String,
    pub question_id: Option<String>,
    pub round_number: u32,
    pub is_answered_correctly: bool,
    pub experts_answer: Option<String>,
    pub time_started: Option<SystemTime>,
    pub time_answered: Option<SystemTime>,
    pub time_limit_seconds: u32,
    /// Running merge of every display update sent for this round.
    #[serde(default)]
    pub display_status: DisplayStatus,
    pub status: RoundStatus,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl RoundEntity {
    /// Fresh pending round for `game_id`.
    pub fn new(id: String, game_id: String, round_number: u32) -> Self {
        let now = SystemTime::now();
        Self {
            id,
            game_id,
            question_id: None,
            round_number,
            is_answered_correctly: false,
            experts_answer: None,
            time_started: None,
            time_answered: None,
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
            display_status: DisplayStatus::new(),
            status: RoundStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A question from the pool, optionally sent in by a viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    pub id: String,
    pub viewer_id: Option<String>,
    pub text: String,
    /// Presentation type (`text`, `image`, `video`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub media_url: Option<String>,
    pub media_thumbnail_url: Option<String>,
    pub difficulty: Option<u32>,
    pub category: Option<String>,
    pub is_approved: bool,
    pub approved_at: Option<SystemTime>,
    pub question_status: QuestionStatus,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// A viewer who submitted questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewerEntity {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: SystemTime,
}

/// A member of the experts' table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpertEntity {
    pub id: String,
    pub name: String,
    /// Free-form status, `active` by default.
    pub status: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// A persisted entity addressed by a string id.
pub trait Record {
    const KIND: RecordKind;

    fn record_id(&self) -> &str;
}

macro_rules! impl_record {
    ($($entity:ty => $kind:ident),* $(,)?) => {
        $(
            impl Record for $entity {
                const KIND: RecordKind = RecordKind::$kind;

                fn record_id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_record! {
    GameEntity => Game,
    RoundEntity => Round,
    QuestionEntity => Question,
    ViewerEntity => Viewer,
    ExpertEntity => Expert,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_status_round_trips_unknown_values() {
        let status: RoundStatus = serde_json::from_str("\"answer_shown\"").unwrap();
        assert_eq!(status, RoundStatus::Other("answer_shown".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"answer_shown\"");
    }

    #[test]
    fn round_status_parses_known_values() {
        let status: RoundStatus = serde_json::from_str("\"question_shown\"").unwrap();
        assert_eq!(status, RoundStatus::QuestionShown);
    }

    #[test]
    fn new_game_uses_defaults() {
        let game = GameEntity::new("g1".into());
        assert_eq!(game.status, GameStatus::Pending);
        assert_eq!(game.max_rounds, DEFAULT_MAX_ROUNDS);
        assert_eq!((game.experts_score, game.viewers_score), (0, 0));
    }
}
