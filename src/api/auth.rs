//! Authentication endpoints

use axum::{extract::State, http::HeaderMap};
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{LoginRequest, LoginResponse, VerifyResponse},
};

use super::{bearer_token, extract::Json};

/// Authenticate with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request.validate()?;
    let response = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(response))
}

/// Check a bearer token and return the role it carries
#[utoipa::path(
    get,
    path = "/auth/verify",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn verify(
    State(state): State<crate::AppState>,
    headers: HeaderMap,
) -> AppResult<Json<VerifyResponse>> {
    let token = bearer_token(&headers)?;
    let response = state.services.auth.verify_token(token)?;
    Ok(Json(response))
}
