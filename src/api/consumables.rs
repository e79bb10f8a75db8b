//! Consumable stock endpoints

use axum::{
    extract::State,
    http::StatusCode,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        consumable::{Consumable, CreateConsumable, Restock, UpdateConsumable},
        user::{ANY_ROLE, STAFF},
    },
};

use super::{
    extract::{Json, Path},
    AuthenticatedUser,
};

/// List consumables
#[utoipa::path(
    get,
    path = "/consumables",
    tag = "consumables",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Consumables", body = Vec<Consumable>)
    )
)]
pub async fn list_consumables(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Consumable>>> {
    claims.require_role(ANY_ROLE)?;
    let consumables = state.services.consumables.list().await?;
    Ok(Json(consumables))
}

/// Get consumable by ID
#[utoipa::path(
    get,
    path = "/consumables/{id}",
    tag = "consumables",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Consumable ID")),
    responses(
        (status = 200, description = "Consumable", body = Consumable),
        (status = 404, description = "Consumable not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_consumable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Consumable>> {
    claims.require_role(ANY_ROLE)?;
    let consumable = state.services.consumables.get_by_id(id).await?;
    Ok(Json(consumable))
}

/// Create consumable
#[utoipa::path(
    post,
    path = "/consumables",
    tag = "consumables",
    security(("bearer_auth" = [])),
    request_body = CreateConsumable,
    responses(
        (status = 201, description = "Consumable created", body = Consumable)
    )
)]
pub async fn create_consumable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateConsumable>,
) -> AppResult<(StatusCode, Json<Consumable>)> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let consumable = state.services.consumables.create(&data).await?;
    Ok((StatusCode::CREATED, Json(consumable)))
}

/// Update consumable
#[utoipa::path(
    patch,
    path = "/consumables/{id}",
    tag = "consumables",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Consumable ID")),
    request_body = UpdateConsumable,
    responses(
        (status = 200, description = "Consumable updated", body = Consumable)
    )
)]
pub async fn update_consumable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateConsumable>,
) -> AppResult<Json<Consumable>> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let consumable = state.services.consumables.update(id, &data).await?;
    Ok(Json(consumable))
}

/// Delete consumable
#[utoipa::path(
    delete,
    path = "/consumables/{id}",
    tag = "consumables",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Consumable ID")),
    responses(
        (status = 204, description = "Consumable deleted")
    )
)]
pub async fn delete_consumable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_role(STAFF)?;
    state.services.consumables.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add units to a consumable
#[utoipa::path(
    patch,
    path = "/consumables/{id}/restock",
    tag = "consumables",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Consumable ID")),
    request_body = Restock,
    responses(
        (status = 200, description = "Consumable restocked", body = Consumable)
    )
)]
pub async fn restock_consumable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<Restock>,
) -> AppResult<Json<Consumable>> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let consumable = state.services.consumables.restock(id, data.quantity).await?;
    Ok(Json(consumable))
}
