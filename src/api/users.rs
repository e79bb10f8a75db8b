//! User account endpoints

use axum::{extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{CreateUser, User, STAFF},
};

use super::{extract::Json, AuthenticatedUser};

/// Register a client account
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    data.validate()?;
    let user = state.services.auth.register(&data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 403, description = "Staff only", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_role(STAFF)?;
    let users = state.services.auth.list_users().await?;
    Ok(Json(users))
}
