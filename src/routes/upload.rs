use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    routing::post,
};

use crate::{
    dto::upload::{UploadForm, UploadResponse},
    error::AppError,
    services::upload_service::{self, IncomingMedia},
    state::SharedState,
};

const FILE_FIELD: &str = "file";
/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Media upload endpoint. Bodies above `max_upload_bytes` are refused before reaching the handler.
pub fn router(max_upload_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/api/upload/media", post(upload_media))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
        ))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Store an image, video or audio file for later display on the TV.
#[utoipa::path(
    post,
    path = "/api/upload/media",
    tag = "upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported media type"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_media(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_owned();
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let stored = upload_service::store_media(
            &state,
            IncomingMedia {
                original_name,
                mime,
                bytes,
            },
        )
        .await?;
        return Ok(Json(stored));
    }

    Err(AppError::BadRequest(format!(
        "multipart field `{FILE_FIELD}` is required"
    )))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use tower::ServiceExt;

    use crate::{config::AppConfig, routes, state::AppState};

    use super::*;

    const BOUNDARY: &str = "quiz-boundary";

    fn multipart_request(name: &str, mime: &str, contents: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{FILE_FIELD}\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/upload/media")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn app(max_upload_bytes: usize, name: &str) -> (axum::Router, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "quiz-show-route-uploads-{name}-{}",
            std::process::id()
        ));
        let state = AppState::new(AppConfig {
            upload_dir: dir.clone(),
            max_upload_bytes,
            ..AppConfig::default()
        });
        (routes::router(state), dir)
    }

    #[tokio::test]
    async fn uploaded_file_is_stored_unchanged() {
        let (app, dir) = app(1024, "ok");
        let contents = b"\x89PNG fake image bytes";

        let response = app
            .oneshot(multipart_request("Logo.png", "image/png", contents))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let stored: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(stored["originalName"], "Logo.png");
        assert_eq!(stored["size"], contents.len());

        let filename = stored["filename"].as_str().unwrap();
        assert_eq!(tokio::fs::read(dir.join(filename)).await.unwrap(), contents);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn unsupported_type_is_a_bad_request() {
        let (app, _dir) = app(1024, "bad-type");
        let response = app
            .oneshot(multipart_request("notes.txt", "text/plain", b"hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
