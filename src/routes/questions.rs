use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use axum_valid::Valid;

use crate::{
    dto::question::{CreateQuestionRequest, QuestionView, UpdateQuestionRequest},
    error::AppError,
    services::question_service,
    state::SharedState,
};

/// Question pool endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/questions", get(list_questions).post(create_question))
        .route("/api/questions/approved", get(list_approved))
        .route(
            "/api/questions/{id}",
            get(get_question).patch(update_question),
        )
        .route("/api/questions/{id}/approve", patch(approve_question))
}

#[utoipa::path(
    get,
    path = "/api/questions",
    tag = "questions",
    responses((status = 200, description = "Questions, newest first", body = [QuestionView]))
)]
pub async fn list_questions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuestionView>>, AppError> {
    Ok(Json(question_service::list_questions(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/questions/approved",
    tag = "questions",
    responses((status = 200, description = "Approved questions, newest first", body = [QuestionView]))
)]
pub async fn list_approved(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuestionView>>, AppError> {
    Ok(Json(question_service::list_approved(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/questions/{id}",
    tag = "questions",
    params(("id" = String, Path, description = "Question identifier")),
    responses(
        (status = 200, description = "Question", body = QuestionView),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn get_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<QuestionView>, AppError> {
    Ok(Json(question_service::get_question(&state, &id).await?))
}

/// Submit a question to the pool; it starts unapproved.
#[utoipa::path(
    post,
    path = "/api/questions",
    tag = "questions",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionView),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_question(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateQuestionRequest>>,
) -> Result<(StatusCode, Json<QuestionView>), AppError> {
    let question = question_service::create_question(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[utoipa::path(
    patch,
    path = "/api/questions/{id}",
    tag = "questions",
    params(("id" = String, Path, description = "Question identifier")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = QuestionView),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn update_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpdateQuestionRequest>>,
) -> Result<Json<QuestionView>, AppError> {
    Ok(Json(
        question_service::update_question(&state, &id, payload).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/questions/{id}/approve",
    tag = "questions",
    params(("id" = String, Path, description = "Question identifier")),
    responses(
        (status = 200, description = "Question approved", body = QuestionView),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn approve_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<QuestionView>, AppError> {
    Ok(Json(question_service::approve_question(&state, &id).await?))
}
