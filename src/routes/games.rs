use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::game::{CreateGameRequest, GameView, UpdateGameRequest},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Game lifecycle and score endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/games", get(list_games).post(create_game))
        .route("/api/games/active", get(active_game))
        .route("/api/games/{id}", get(get_game).patch(update_game))
        .route("/api/games/{id}/start", post(start_game))
}

/// List every game, newest first.
#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    responses((status = 200, description = "Games, newest first", body = [GameView]))
)]
pub async fn list_games(State(state): State<SharedState>) -> Result<Json<Vec<GameView>>, AppError> {
    Ok(Json(game_service::list_games(&state).await?))
}

/// The game currently on air, or `null`.
#[utoipa::path(
    get,
    path = "/api/games/active",
    tag = "games",
    responses((status = 200, description = "Most recent active game", body = Option<GameView>))
)]
pub async fn active_game(
    State(state): State<SharedState>,
) -> Result<Json<Option<GameView>>, AppError> {
    Ok(Json(game_service::find_active_game(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game", body = GameView),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(game_service::get_game(&state, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameView),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameView>), AppError> {
    let game = game_service::create_game(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

#[utoipa::path(
    patch,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = GameView),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpdateGameRequest>>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(game_service::update_game(&state, &id, payload).await?))
}

/// Put a game on air.
#[utoipa::path(
    post,
    path = "/api/games/{id}/start",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game started", body = GameView),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(game_service::start_game(&state, &id).await?))
}
