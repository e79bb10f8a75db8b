//! File upload endpoint

use axum::{
    extract::State,
    http::StatusCode,
};

use crate::{
    error::{AppError, AppResult},
    models::user::ANY_ROLE,
    services::storage::UploadResponse,
};

use super::{
    extract::{Json, Multipart},
    AuthenticatedUser,
};

/// Upload a file (multipart field `file`) to blob storage
#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    security(("bearer_auth" = [])),
    request_body(content = String, content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing or empty file", body = crate::error::ErrorResponse),
        (status = 502, description = "Blob storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Multipart(mut multipart): Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    claims.require_role(ANY_ROLE)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read uploaded file: {}", e)))?;

        let response = state
            .services
            .upload
            .upload(file_name.as_deref(), &content_type, data.to_vec())
            .await?;
        return Ok((StatusCode::CREATED, Json(response)));
    }

    Err(AppError::BadRequest("No file provided in field 'file'".to_string()))
}
