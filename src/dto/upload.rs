use serde::Serialize;
use utoipa::ToSchema;

/// Result of a successful media upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Name the file was stored under.
    pub filename: String,
    /// Name supplied by the client.
    pub original_name: String,
    pub mimetype: String,
    /// Size in bytes.
    pub size: u64,
    /// Public path, e.g. `/uploads/file-1700000000000-42.png`.
    pub url: String,
}

/// Multipart form accepted by the upload endpoint (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
