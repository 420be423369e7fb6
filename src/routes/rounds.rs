use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use axum_valid::Valid;

use crate::{
    display::DisplayStatus,
    dto::round::{CreateRoundRequest, RoundStatusRequest, RoundView, UpdateRoundRequest},
    error::AppError,
    services::round_service,
    state::SharedState,
};

/// Round endpoints, including the display status merge used by the operator console.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/rounds", get(list_rounds).post(create_round))
        .route("/api/rounds/game/{game_id}", get(list_game_rounds))
        .route("/api/rounds/game/{game_id}/current", get(current_round))
        .route("/api/rounds/{id}", get(get_round).patch(update_round))
        .route("/api/rounds/{id}/status", patch(update_status))
        .route("/api/rounds/{id}/display-status", patch(update_display_status))
}

#[utoipa::path(
    get,
    path = "/api/rounds",
    tag = "rounds",
    responses((status = 200, description = "All rounds by round number", body = [RoundView]))
)]
pub async fn list_rounds(
    State(state): State<SharedState>,
) -> Result<Json<Vec<RoundView>>, AppError> {
    Ok(Json(round_service::list_rounds(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/rounds/game/{game_id}",
    tag = "rounds",
    params(("game_id" = String, Path, description = "Game identifier")),
    responses((status = 200, description = "Rounds of the game by round number", body = [RoundView]))
)]
pub async fn list_game_rounds(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<Vec<RoundView>>, AppError> {
    Ok(Json(round_service::list_game_rounds(&state, &game_id).await?))
}

/// The round with the highest number in the game, or `null`.
#[utoipa::path(
    get,
    path = "/api/rounds/game/{game_id}/current",
    tag = "rounds",
    params(("game_id" = String, Path, description = "Game identifier")),
    responses((status = 200, description = "Current round", body = Option<RoundView>))
)]
pub async fn current_round(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<Option<RoundView>>, AppError> {
    Ok(Json(round_service::current_round(&state, &game_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/rounds/{id}",
    tag = "rounds",
    params(("id" = String, Path, description = "Round identifier")),
    responses(
        (status = 200, description = "Round", body = RoundView),
        (status = 404, description = "Unknown round")
    )
)]
pub async fn get_round(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<RoundView>, AppError> {
    Ok(Json(round_service::get_round(&state, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/rounds",
    tag = "rounds",
    request_body = CreateRoundRequest,
    responses(
        (status = 201, description = "Round created", body = RoundView),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn create_round(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateRoundRequest>>,
) -> Result<(StatusCode, Json<RoundView>), AppError> {
    let round = round_service::create_round(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(round)))
}

#[utoipa::path(
    patch,
    path = "/api/rounds/{id}",
    tag = "rounds",
    params(("id" = String, Path, description = "Round identifier")),
    request_body = UpdateRoundRequest,
    responses(
        (status = 200, description = "Round updated", body = RoundView),
        (status = 404, description = "Unknown round")
    )
)]
pub async fn update_round(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpdateRoundRequest>>,
) -> Result<Json<RoundView>, AppError> {
    Ok(Json(round_service::update_round(&state, &id, payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/rounds/{id}/status",
    tag = "rounds",
    params(("id" = String, Path, description = "Round identifier")),
    request_body = RoundStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = RoundView),
        (status = 404, description = "Unknown round")
    )
)]
pub async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<RoundStatusRequest>>,
) -> Result<Json<RoundView>, AppError> {
    Ok(Json(
        round_service::update_status(&state, &id, payload.status).await?,
    ))
}

/// Merge keys into the display status without notifying the relay.
#[utoipa::path(
    patch,
    path = "/api/rounds/{id}/display-status",
    tag = "rounds",
    params(("id" = String, Path, description = "Round identifier")),
    request_body = DisplayStatus,
    responses(
        (status = 200, description = "Merged display status", body = RoundView),
        (status = 404, description = "Unknown round")
    )
)]
pub async fn update_display_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(patch): Json<DisplayStatus>,
) -> Result<Json<RoundView>, AppError> {
    Ok(Json(
        round_service::merge_display_status(&state, &id, patch).await?,
    ))
}
