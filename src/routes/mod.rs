use axum::Router;
use tower_http::services::ServeDir;

use crate::{services::upload_service::UPLOADS_ROUTE, state::SharedState};

pub mod docs;
pub mod games;
pub mod health;
pub mod people;
pub mod questions;
pub mod rounds;
pub mod upload;
pub mod websocket;

/// Compose all route trees, wiring in shared state, uploaded media and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let config = state.config();

    let api_router = health::router()
        .merge(websocket::router())
        .merge(games::router())
        .merge(rounds::router())
        .merge(questions::router())
        .merge(people::router())
        .merge(upload::router(config.max_upload_bytes))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&config.upload_dir));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, dao::show_store::MemoryShowStore, state::AppState};

    fn app() -> Router {
        router(AppState::with_store(
            AppConfig::default(),
            Arc::new(MemoryShowStore::new()),
        ))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn created_game_can_be_fetched() {
        let app = app();

        let created = app
            .clone()
            .oneshot(json_request("POST", "/api/games", json!({"max_rounds": 11})))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let game = body_json(created).await;

        let fetched = app
            .oneshot(
                Request::get(format!("/api/games/{}", game["id"].as_str().unwrap()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(fetched.status(), StatusCode::OK);
        assert_eq!(body_json(fetched).await["max_rounds"], 11);
    }

    #[tokio::test]
    async fn deleting_a_viewer_answers_204_then_404() {
        let app = app();

        let created = app
            .clone()
            .oneshot(json_request("POST", "/api/viewers", json!({"name": "Ann"})))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let uri = format!("/api/viewers/{}", body_json(created).await["id"].as_str().unwrap());

        let delete = || Request::delete(uri.as_str()).body(Body::empty()).unwrap();
        let removed = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(removed.status(), StatusCode::NO_CONTENT);

        let again = app.oneshot(delete()).await.unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_round_is_a_json_404() {
        let response = app()
            .oneshot(Request::get("/api/rounds/r404").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("Round with ID r404 not found"));
    }

    #[tokio::test]
    async fn invalid_bodies_are_rejected() {
        let response = app()
            .oneshot(json_request("POST", "/api/experts", json!({"name": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn active_game_is_null_when_nothing_is_on_air() {
        let response = app()
            .oneshot(Request::get("/api/games/active").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, Value::Null);
    }

    #[tokio::test]
    async fn degraded_backend_answers_503() {
        let app = router(AppState::new(AppConfig::default()));
        let response = app
            .oneshot(Request::get("/api/games").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
