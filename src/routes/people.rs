use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::people::{
        CreateExpertRequest, CreateViewerRequest, ExpertView, UpdateExpertRequest,
        UpdateViewerRequest, ViewerView,
    },
    error::AppError,
    services::people_service,
    state::SharedState,
};

/// Viewer and expert endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/viewers", get(list_viewers).post(create_viewer))
        .route(
            "/api/viewers/{id}",
            get(get_viewer).patch(update_viewer).delete(delete_viewer),
        )
        .route("/api/experts", get(list_experts).post(create_expert))
        .route(
            "/api/experts/{id}",
            get(get_expert).patch(update_expert).delete(delete_expert),
        )
}

#[utoipa::path(
    get,
    path = "/api/viewers",
    tag = "viewers",
    responses((status = 200, description = "Viewers, newest first", body = [ViewerView]))
)]
pub async fn list_viewers(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ViewerView>>, AppError> {
    Ok(Json(people_service::list_viewers(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/viewers/{id}",
    tag = "viewers",
    params(("id" = String, Path, description = "Viewer identifier")),
    responses(
        (status = 200, description = "Viewer", body = ViewerView),
        (status = 404, description = "Unknown viewer")
    )
)]
pub async fn get_viewer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ViewerView>, AppError> {
    Ok(Json(people_service::get_viewer(&state, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/viewers",
    tag = "viewers",
    request_body = CreateViewerRequest,
    responses(
        (status = 201, description = "Viewer registered", body = ViewerView),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_viewer(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateViewerRequest>>,
) -> Result<(StatusCode, Json<ViewerView>), AppError> {
    let viewer = people_service::create_viewer(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(viewer)))
}

#[utoipa::path(
    patch,
    path = "/api/viewers/{id}",
    tag = "viewers",
    params(("id" = String, Path, description = "Viewer identifier")),
    request_body = UpdateViewerRequest,
    responses(
        (status = 200, description = "Viewer updated", body = ViewerView),
        (status = 404, description = "Unknown viewer")
    )
)]
pub async fn update_viewer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpdateViewerRequest>>,
) -> Result<Json<ViewerView>, AppError> {
    Ok(Json(
        people_service::update_viewer(&state, &id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/viewers/{id}",
    tag = "viewers",
    params(("id" = String, Path, description = "Viewer identifier")),
    responses(
        (status = 204, description = "Viewer removed"),
        (status = 404, description = "Unknown viewer")
    )
)]
pub async fn delete_viewer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    people_service::delete_viewer(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/experts",
    tag = "experts",
    responses((status = 200, description = "Experts by name", body = [ExpertView]))
)]
pub async fn list_experts(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ExpertView>>, AppError> {
    Ok(Json(people_service::list_experts(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/experts/{id}",
    tag = "experts",
    params(("id" = String, Path, description = "Expert identifier")),
    responses(
        (status = 200, description = "Expert", body = ExpertView),
        (status = 404, description = "Unknown expert")
    )
)]
pub async fn get_expert(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ExpertView>, AppError> {
    Ok(Json(people_service::get_expert(&state, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/experts",
    tag = "experts",
    request_body = CreateExpertRequest,
    responses(
        (status = 201, description = "Expert added", body = ExpertView),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_expert(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateExpertRequest>>,
) -> Result<(StatusCode, Json<ExpertView>), AppError> {
    let expert = people_service::create_expert(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(expert)))
}

#[utoipa::path(
    patch,
    path = "/api/experts/{id}",
    tag = "experts",
    params(("id" = String, Path, description = "Expert identifier")),
    request_body = UpdateExpertRequest,
    responses(
        (status = 200, description = "Expert updated", body = ExpertView),
        (status = 404, description = "Unknown expert")
    )
)]
pub async fn update_expert(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpdateExpertRequest>>,
) -> Result<Json<ExpertView>, AppError> {
    Ok(Json(
        people_service::update_expert(&state, &id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/experts/{id}",
    tag = "experts",
    params(("id" = String, Path, description = "Expert identifier")),
    responses(
        (status = 204, description = "Expert removed"),
        (status = 404, description = "Unknown expert")
    )
)]
pub async fn delete_expert(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    people_service::delete_expert(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
