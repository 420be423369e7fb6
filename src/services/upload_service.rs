use std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::body::Bytes;
use rand::Rng;
use tokio::fs;
use tracing::info;

use crate::{dto::upload::UploadResponse, error::ServiceError, state::SharedState};

/// Public URL prefix uploaded files are served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// A file received from the multipart form, before it is validated.
#[derive(Debug)]
pub struct IncomingMedia {
    /// File name supplied by the client.
    pub original_name: String,
    /// Content type of the multipart field.
    pub mime: String,
    /// File contents as received, without an extra copy.
    pub bytes: Bytes,
}

/// Extension of `original_name` including the leading dot, or empty.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn generated_name(original_name: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let suffix = rand::rng().random_range(0..1_000_000_000u32);
    format!("file-{millis}-{suffix}{}", extension_of(original_name))
}

/// Validate `media` against the configured limits and write it to the upload directory.
pub async fn store_media(
    state: &SharedState,
    media: IncomingMedia,
) -> Result<UploadResponse, ServiceError> {
    let config = state.config();

    if !config.accepts_media_type(&media.mime) {
        return Err(ServiceError::InvalidInput(format!(
            "unsupported media type {}",
            media.mime
        )));
    }
    if media.bytes.len() > config.max_upload_bytes {
        return Err(ServiceError::PayloadTooLarge(format!(
            "file exceeds {} bytes",
            config.max_upload_bytes
        )));
    }

    let filename = generated_name(&media.original_name);
    fs::create_dir_all(&config.upload_dir).await?;
    fs::write(config.upload_dir.join(&filename), &media.bytes).await?;

    info!(
        filename = %filename,
        original = %media.original_name,
        mime = %media.mime,
        size = media.bytes.len(),
        "media stored"
    );

    Ok(UploadResponse {
        success: true,
        url: format!("{UPLOADS_ROUTE}/{filename}"),
        filename,
        original_name: media.original_name,
        mimetype: media.mime,
        size: media.bytes.len() as u64,
    })
}
