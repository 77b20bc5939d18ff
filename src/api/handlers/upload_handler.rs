//! File upload handlers.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::api::extractors::ActiveAccount;
use crate::api::AppState;
use crate::config::MAX_FILE_SIZE;
use crate::errors::{AppError, AppResult};
use crate::services::{UploadFile, UploadResponse};
use crate::types::{Created, NoContent};

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(upload_file).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + MULTIPART_OVERHEAD)),
        )
        .route("/*key", get(download_file).delete(delete_file))
}

/// Upload a file (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "Uploads",
    security(("bearer_auth" = [])),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Multipart form with a `file` field"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing file, disallowed type or too large"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    ActiveAccount(account): ActiveAccount,
    mut multipart: Multipart,
) -> AppResult<Created<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or(FILE_FIELD).to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        let stored = state
            .uploads
            .upload(
                account,
                UploadFile {
                    filename,
                    content_type,
                    bytes,
                },
            )
            .await?;
        return Ok(Created(stored));
    }

    Err(AppError::bad_request(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

/// Download a stored file
#[utoipa::path(
    get,
    path = "/api/v1/uploads/{key}",
    tag = "Uploads",
    security(("bearer_auth" = [])),
    params(("key" = String, Path, description = "File key returned by the upload")),
    responses(
        (status = 200, description = "File contents"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    ActiveAccount(_account): ActiveAccount,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let file = state.uploads.download(key).await?;
    Ok(([(header::CONTENT_TYPE, file.content_type)], file.bytes))
}

/// Delete a stored file (owner or superuser)
#[utoipa::path(
    delete,
    path = "/api/v1/uploads/{key}",
    tag = "Uploads",
    security(("bearer_auth" = [])),
    params(("key" = String, Path, description = "File key returned by the upload")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 403, description = "Not the file owner"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    State(state): State<AppState>,
    ActiveAccount(account): ActiveAccount,
    Path(key): Path<String>,
) -> AppResult<NoContent> {
    state.uploads.delete(account, key).await?;
    Ok(NoContent)
}
