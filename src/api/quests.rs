//! Quest endpoints: CRUD, lifecycle transitions and assignments

use axum::{
    extract::State,
    http::StatusCode,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        quest::{
            ConsumablesInput, CreateQuest, FinishQuest, IdsInput, QuestDetails, QuestQuery,
            UpdateQuest, UpdateQuestStatus,
        },
        user::{ANY_ROLE, STAFF},
    },
    services::quests::SetOp,
};

use super::{
    extract::{Json, Path, Query},
    AuthenticatedUser,
};

/// List quests
#[utoipa::path(
    get,
    path = "/quests",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(QuestQuery),
    responses(
        (status = 200, description = "Quests matching the filters", body = Vec<QuestDetails>)
    )
)]
pub async fn list_quests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<QuestQuery>,
) -> AppResult<Json<Vec<QuestDetails>>> {
    claims.require_role(ANY_ROLE)?;
    let quests = state.services.quests.find_all(&query).await?;
    Ok(Json(quests))
}

/// Get quest by ID
#[utoipa::path(
    get,
    path = "/quests/{id}",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    responses(
        (status = 200, description = "Quest details", body = QuestDetails),
        (status = 404, description = "Quest not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_quest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    let quest = state.services.quests.find_one(id).await?;
    Ok(Json(quest))
}

/// Create a quest owned by the caller
#[utoipa::path(
    post,
    path = "/quests",
    tag = "quests",
    security(("bearer_auth" = [])),
    request_body = CreateQuest,
    responses(
        (status = 201, description = "Quest created", body = QuestDetails),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown adventurer or stock", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_quest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateQuest>,
) -> AppResult<(StatusCode, Json<QuestDetails>)> {
    claims.require_role(ANY_ROLE)?;
    data.validate()?;
    let quest = state.services.quests.create(claims.sub, &data).await?;
    Ok((StatusCode::CREATED, Json(quest)))
}

/// Update quest fields (status goes back to waiting)
#[utoipa::path(
    patch,
    path = "/quests/{id}",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = UpdateQuest,
    responses(
        (status = 200, description = "Quest updated", body = QuestDetails),
        (status = 400, description = "Quest can no longer be edited", body = crate::error::ErrorResponse),
        (status = 404, description = "Quest not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_quest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateQuest>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    data.validate()?;
    let quest = state.services.quests.update(id, &data).await?;
    Ok(Json(quest))
}

// =========================================================================
// Lifecycle
// =========================================================================

/// Change status by id or name; clients may only cancel
#[utoipa::path(
    patch,
    path = "/quests/{id}/status",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = UpdateQuestStatus,
    responses(
        (status = 200, description = "Status changed", body = QuestDetails),
        (status = 400, description = "Transition not allowed", body = crate::error::ErrorResponse),
        (status = 403, description = "Only staff may set this status", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateQuestStatus>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    let target = state.services.quests.status_target(&data).await?;
    claims.require_role(target.required_roles())?;
    let quest = state.services.quests.update_status(id, target).await?;
    Ok(Json(quest))
}

/// Validate a waiting quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/validate",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    responses(
        (status = 200, description = "Quest validated", body = QuestDetails),
        (status = 400, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn validate_quest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(STAFF)?;
    let quest = state.services.quests.validate(id).await?;
    Ok(Json(quest))
}

/// Send a validated quest back to waiting
#[utoipa::path(
    patch,
    path = "/quests/{id}/invalidate",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    responses(
        (status = 200, description = "Quest invalidated", body = QuestDetails),
        (status = 400, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn invalidate_quest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(STAFF)?;
    let quest = state.services.quests.invalidate(id).await?;
    Ok(Json(quest))
}

/// Refuse a quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/refuse",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    responses(
        (status = 200, description = "Quest refused", body = QuestDetails),
        (status = 400, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn refuse_quest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(STAFF)?;
    let quest = state.services.quests.refuse(id).await?;
    Ok(Json(quest))
}

/// Abandon a quest before it starts
#[utoipa::path(
    patch,
    path = "/quests/{id}/abandon",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    responses(
        (status = 200, description = "Quest abandoned", body = QuestDetails),
        (status = 400, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn abandon_quest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    let quest = state.services.quests.abandon(id).await?;
    Ok(Json(quest))
}

/// Start a validated quest: borrows equipment and books adventurers
#[utoipa::path(
    patch,
    path = "/quests/{id}/start",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    responses(
        (status = 200, description = "Quest started", body = QuestDetails),
        (status = 400, description = "Quest cannot start or an adventurer is booked", body = crate::error::ErrorResponse)
    )
)]
pub async fn start_quest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(STAFF)?;
    let quest = state.services.quests.start(id).await?;
    Ok(Json(quest))
}

/// Close a started quest and settle salaries, wear and reward
#[utoipa::path(
    patch,
    path = "/quests/{id}/finish",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = FinishQuest,
    responses(
        (status = 200, description = "Quest finished", body = QuestDetails),
        (status = 400, description = "Quest is not started", body = crate::error::ErrorResponse)
    )
)]
pub async fn finish_quest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<FinishQuest>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(STAFF)?;
    let quest = state.services.quests.finish(id, data.is_success).await?;
    Ok(Json(quest))
}

// =========================================================================
// Assignments
// =========================================================================

async fn assign_adventurers(
    state: &crate::AppState,
    id: i32,
    op: SetOp,
    data: &IdsInput,
) -> AppResult<Json<QuestDetails>> {
    let quest = state.services.quests.set_adventurers(id, op, &data.ids).await?;
    Ok(Json(quest))
}

async fn assign_equipment_stocks(
    state: &crate::AppState,
    id: i32,
    op: SetOp,
    data: &IdsInput,
) -> AppResult<Json<QuestDetails>> {
    let quest = state.services.quests.set_equipment_stocks(id, op, &data.ids).await?;
    Ok(Json(quest))
}

async fn assign_consumables(
    state: &crate::AppState,
    id: i32,
    op: SetOp,
    data: &ConsumablesInput,
) -> AppResult<Json<QuestDetails>> {
    data.validate()?;
    let quest = state
        .services
        .quests
        .set_consumables(id, op, &data.consumables)
        .await?;
    Ok(Json(quest))
}

/// Add adventurers to a quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/adventurers/attach",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = IdsInput,
    responses(
        (status = 200, description = "Adventurers attached", body = QuestDetails),
        (status = 404, description = "Unknown adventurer", body = crate::error::ErrorResponse)
    )
)]
pub async fn attach_adventurers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<IdsInput>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    assign_adventurers(&state, id, SetOp::Attach, &data).await
}

/// Remove adventurers from a quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/adventurers/detach",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = IdsInput,
    responses(
        (status = 200, description = "Adventurers detached", body = QuestDetails)
    )
)]
pub async fn detach_adventurers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<IdsInput>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    assign_adventurers(&state, id, SetOp::Detach, &data).await
}

/// Replace the adventurers of a quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/adventurers/set",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = IdsInput,
    responses(
        (status = 200, description = "Adventurers replaced", body = QuestDetails),
        (status = 404, description = "Unknown adventurer", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_adventurers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<IdsInput>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    assign_adventurers(&state, id, SetOp::Replace, &data).await
}

/// Add equipment stocks to a quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/equipment-stocks/attach",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = IdsInput,
    responses(
        (status = 200, description = "Stocks attached", body = QuestDetails),
        (status = 400, description = "Stock not assignable", body = crate::error::ErrorResponse)
    )
)]
pub async fn attach_equipment_stocks(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<IdsInput>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    assign_equipment_stocks(&state, id, SetOp::Attach, &data).await
}

/// Remove equipment stocks from a quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/equipment-stocks/detach",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = IdsInput,
    responses(
        (status = 200, description = "Stocks detached", body = QuestDetails)
    )
)]
pub async fn detach_equipment_stocks(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<IdsInput>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    assign_equipment_stocks(&state, id, SetOp::Detach, &data).await
}

/// Replace the equipment stocks of a quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/equipment-stocks/set",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = IdsInput,
    responses(
        (status = 200, description = "Stocks replaced", body = QuestDetails),
        (status = 400, description = "Stock not assignable", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_equipment_stocks(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<IdsInput>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    assign_equipment_stocks(&state, id, SetOp::Replace, &data).await
}

/// Reserve consumables for a quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/consumables/attach",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = ConsumablesInput,
    responses(
        (status = 200, description = "Consumables reserved", body = QuestDetails),
        (status = 400, description = "Not enough stock", body = crate::error::ErrorResponse)
    )
)]
pub async fn attach_consumables(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ConsumablesInput>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    assign_consumables(&state, id, SetOp::Attach, &data).await
}

/// Release reserved consumables
#[utoipa::path(
    patch,
    path = "/quests/{id}/consumables/detach",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = ConsumablesInput,
    responses(
        (status = 200, description = "Consumables released", body = QuestDetails)
    )
)]
pub async fn detach_consumables(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ConsumablesInput>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    assign_consumables(&state, id, SetOp::Detach, &data).await
}

/// Replace the consumable reservations of a quest
#[utoipa::path(
    patch,
    path = "/quests/{id}/consumables/set",
    tag = "quests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quest ID")),
    request_body = ConsumablesInput,
    responses(
        (status = 200, description = "Consumables replaced", body = QuestDetails),
        (status = 400, description = "Not enough stock", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_consumables(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ConsumablesInput>,
) -> AppResult<Json<QuestDetails>> {
    claims.require_role(ANY_ROLE)?;
    assign_consumables(&state, id, SetOp::Replace, &data).await
}
