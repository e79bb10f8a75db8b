//! Adventurer roster endpoints

use axum::{
    extract::State,
    http::StatusCode,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        adventurer::{Adventurer, AdventurerDetails, AdventurerQuery, CreateAdventurer, UpdateAdventurer},
        user::{ANY_ROLE, STAFF},
    },
};

use super::{
    extract::{Json, Path, Query},
    AuthenticatedUser,
};

/// List adventurers
#[utoipa::path(
    get,
    path = "/adventurers",
    tag = "adventurers",
    security(("bearer_auth" = [])),
    params(AdventurerQuery),
    responses(
        (status = 200, description = "Adventurers matching the filters", body = Vec<Adventurer>)
    )
)]
pub async fn list_adventurers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AdventurerQuery>,
) -> AppResult<Json<Vec<Adventurer>>> {
    claims.require_role(ANY_ROLE)?;
    let adventurers = state.services.adventurers.find_all(&query).await?;
    Ok(Json(adventurers))
}

/// Get adventurer by ID
#[utoipa::path(
    get,
    path = "/adventurers/{id}",
    tag = "adventurers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Adventurer ID")),
    responses(
        (status = 200, description = "Adventurer details", body = AdventurerDetails),
        (status = 404, description = "Adventurer not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_adventurer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AdventurerDetails>> {
    claims.require_role(ANY_ROLE)?;
    let adventurer = state.services.adventurers.find_one(id).await?;
    Ok(Json(adventurer))
}

/// Create adventurer
#[utoipa::path(
    post,
    path = "/adventurers",
    tag = "adventurers",
    security(("bearer_auth" = [])),
    request_body = CreateAdventurer,
    responses(
        (status = 201, description = "Adventurer created", body = AdventurerDetails),
        (status = 404, description = "Unknown speciality or type", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_adventurer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAdventurer>,
) -> AppResult<(StatusCode, Json<AdventurerDetails>)> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let adventurer = state.services.adventurers.create(&data).await?;
    Ok((StatusCode::CREATED, Json(adventurer)))
}

/// Update adventurer
#[utoipa::path(
    patch,
    path = "/adventurers/{id}",
    tag = "adventurers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Adventurer ID")),
    request_body = UpdateAdventurer,
    responses(
        (status = 200, description = "Adventurer updated", body = AdventurerDetails),
        (status = 404, description = "Adventurer not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_adventurer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAdventurer>,
) -> AppResult<Json<AdventurerDetails>> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let adventurer = state.services.adventurers.update(id, &data).await?;
    Ok(Json(adventurer))
}

/// Delete adventurer
#[utoipa::path(
    delete,
    path = "/adventurers/{id}",
    tag = "adventurers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Adventurer ID")),
    responses(
        (status = 204, description = "Adventurer deleted"),
        (status = 404, description = "Adventurer not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_adventurer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_role(STAFF)?;
    state.services.adventurers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
