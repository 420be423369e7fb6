use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{GameEntity, GameStatus},
    dto::{format_optional_time, format_system_time, validation::validate_game_date},
};

/// Public projection of a game with its running score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GameView {
    pub id: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub experts_score: u32,
    pub viewers_score: u32,
    #[schema(value_type = String, example = "active")]
    pub status: GameStatus,
    pub current_round_number: u32,
    pub max_rounds: u32,
    pub game_date: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameEntity> for GameView {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            start_time: format_optional_time(game.start_time),
            end_time: format_optional_time(game.end_time),
            experts_score: game.experts_score,
            viewers_score: game.viewers_score,
            status: game.status,
            current_round_number: game.current_round_number,
            max_rounds: game.max_rounds,
            game_date: game.game_date,
            season_number: game.season_number,
            episode_number: game.episode_number,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
        }
    }
}

/// Payload used to create a game; every field falls back to its default.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreateGameRequest {
    pub experts_score: Option<u32>,
    pub viewers_score: Option<u32>,
    #[schema(value_type = Option<String>)]
    pub status: Option<GameStatus>,
    #[validate(range(min = 1, max = 100))]
    pub max_rounds: Option<u32>,
    #[validate(custom(function = "validate_game_date"))]
    pub game_date: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
}

/// Partial update of a game; absent fields keep their stored value.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateGameRequest {
    pub experts_score: Option<u32>,
    pub viewers_score: Option<u32>,
    #[schema(value_type = Option<String>)]
    pub status: Option<GameStatus>,
    pub current_round_number: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub max_rounds: Option<u32>,
    #[validate(custom(function = "validate_game_date"))]
    pub game_date: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
}

impl CreateGameRequest {
    pub fn into_entity(self, id: String) -> GameEntity {
        let mut game = GameEntity::new(id);
        UpdateGameRequest {
            experts_score: self.experts_score,
            viewers_score: self.viewers_score,
            status: self.status,
            current_round_number: None,
            max_rounds: self.max_rounds,
            game_date: self.game_date,
            season_number: self.season_number,
            episode_number: self.episode_number,
        }
        .apply_to(&mut game);
        game
    }
}

impl UpdateGameRequest {
    /// Overwrite the fields present in the request.
    pub fn apply_to(self, game: &mut GameEntity) {
        if let Some(score) = self.experts_score {
            game.experts_score = score;
        }
        if let Some(score) = self.viewers_score {
            game.viewers_score = score;
        }
        if let Some(status) = self.status {
            game.status = status;
        }
        if let Some(number) = self.current_round_number {
            game.current_round_number = number;
        }
        if let Some(max_rounds) = self.max_rounds {
            game.max_rounds = max_rounds;
        }
        game.game_date = self.game_date.or(game.game_date.take());
        game.season_number = self.season_number.or(game.season_number);
        game.episode_number = self.episode_number.or(game.episode_number);
    }
}
