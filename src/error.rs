//! Error types for the guild server

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Request, State,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::AppState;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Translate database failures into the API taxonomy.
///
/// This is the only place where driver errors are inspected: missing rows,
/// unique violations, foreign key, check and numeric range violations become
/// client errors, everything else stays a database error.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") => AppError::Conflict(format!(
                    "Duplicate entry: {}",
                    db.constraint().unwrap_or("unique constraint violation")
                )),
                Some("23503") => AppError::BadRequest("Foreign key constraint failed".to_string()),
                Some("23514") => AppError::BadRequest(format!(
                    "Check constraint failed: {}",
                    db.constraint().unwrap_or("unknown")
                )),
                Some("22003") => AppError::BadRequest("Numeric value out of range".to_string()),
                _ => AppError::Database(err),
            },
            _ => AppError::Database(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short error name carried in the `error` field of the body
    pub fn name(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "Unauthorized",
            AppError::Authorization(_) => "Forbidden",
            AppError::NotFound(_) => "Not Found",
            AppError::Validation(_) => "Validation Error",
            AppError::BadRequest(_) => "Bad Request",
            AppError::Conflict(_) => "Conflict",
            AppError::Database(_) => "Database Error",
            AppError::Internal(_) => "Internal Server Error",
            AppError::Storage(_) => "Bad Gateway",
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, details) = match &self {
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::Storage(msg) => (msg.clone(), None),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error".to_string(), Some(e.to_string()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), Some(msg.clone()))
            }
        };

        let body = ErrorResponse {
            status_code: status.as_u16(),
            message,
            error: self.name().to_string(),
            timestamp: Utc::now(),
            path: String::new(),
            details,
        };

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Complete error bodies with the request path, and drop internal details
/// when running in production.
pub async fn complete_error_body(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    let Some(mut body) = response.extensions().get::<ErrorResponse>().cloned() else {
        return response;
    };

    body.path = path;
    if state.config.server.is_production() {
        body.details = None;
    }

    let status = response.status();
    (status, Json(body)).into_response()
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_maps_to_404_with_body_shape() {
        let (status, body) = body_json(AppError::NotFound("Quest 4 not found".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["message"], "Quest 4 not found");
        assert_eq!(body["error"], "Not Found");
        assert!(body["timestamp"].is_string());
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn internal_errors_hide_message_but_keep_details() {
        let (status, body) = body_json(AppError::Internal("token signing failed".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["details"], "token signing failed");
    }

    #[test]
    fn taxonomy_status_codes() {
        assert_eq!(AppError::Authentication(String::new()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Authorization(String::new()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::BadRequest(String::new()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Validation(String::new()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict(String::new()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Storage(String::new()).status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_row_becomes_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn pool_errors_stay_database_errors() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
