//! Equipment definitions and stock endpoints

use axum::{
    extract::State,
    http::StatusCode,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentStock, StockQuery, UpdateEquipment},
        user::{ANY_ROLE, STAFF},
    },
};

use super::{
    extract::{Json, Path, Query},
    AuthenticatedUser,
};

/// List all equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Equipment>>> {
    claims.require_role(ANY_ROLE)?;
    let equipment = state.services.equipment.list().await?;
    Ok(Json(equipment))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Equipment>> {
    claims.require_role(ANY_ROLE)?;
    let equipment = state.services.equipment.get_by_id(id).await?;
    Ok(Json(equipment))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment)
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let equipment = state.services.equipment.create(&data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment
#[utoipa::path(
    patch,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment)
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let equipment = state.services.equipment.update(id, &data).await?;
    Ok(Json(equipment))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted")
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_role(STAFF)?;
    state.services.equipment.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Stock
// =========================================================================

/// Stock items of one equipment definition
#[utoipa::path(
    get,
    path = "/equipment/{id}/stocks",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Stock items", body = Vec<EquipmentStock>)
    )
)]
pub async fn list_equipment_stocks(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<EquipmentStock>>> {
    claims.require_role(ANY_ROLE)?;
    let stocks = state.services.equipment.stocks_for(id).await?;
    Ok(Json(stocks))
}

/// Add a stock item at full durability
#[utoipa::path(
    post,
    path = "/equipment/{id}/stocks",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 201, description = "Stock item created", body = EquipmentStock)
    )
)]
pub async fn create_stock(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<EquipmentStock>)> {
    claims.require_role(STAFF)?;
    let stock = state.services.equipment.stock_create(id).await?;
    Ok((StatusCode::CREATED, Json(stock)))
}

/// All stock items, optionally filtered by status
#[utoipa::path(
    get,
    path = "/equipment/stocks",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(StockQuery),
    responses(
        (status = 200, description = "Stock items", body = Vec<EquipmentStock>)
    )
)]
pub async fn list_stocks(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<Vec<EquipmentStock>>> {
    claims.require_role(ANY_ROLE)?;
    let stocks = state.services.equipment.stocks_list(query.status).await?;
    Ok(Json(stocks))
}

/// Remove a stock item
#[utoipa::path(
    delete,
    path = "/equipment/stocks/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Stock item ID")),
    responses(
        (status = 204, description = "Stock item deleted"),
        (status = 400, description = "Stock item is borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_stock(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_role(STAFF)?;
    state.services.equipment.stock_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore a stock item to full durability
#[utoipa::path(
    patch,
    path = "/equipment/stocks/{id}/repair",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Stock item ID")),
    responses(
        (status = 200, description = "Stock item repaired", body = EquipmentStock),
        (status = 400, description = "Stock item is borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn repair_stock(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentStock>> {
    claims.require_role(STAFF)?;
    let stock = state.services.equipment.stock_repair(id).await?;
    Ok(Json(stock))
}
