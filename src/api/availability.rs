//! Adventurer availability, schedule and rest period endpoints

use axum::{
    extract::State,
    http::StatusCode,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        adventurer::Adventurer,
        rest::{AdventurerRest, Availability, CreateRest, DaySchedule, PeriodQuery, UpdateRest},
        user::{ANY_ROLE, STAFF},
    },
};

use super::{
    extract::{Json, Path, Query},
    AuthenticatedUser,
};

/// Check whether an adventurer is free over a period
#[utoipa::path(
    get,
    path = "/adventurer-availability/{adventurer_id}/check",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(
        ("adventurer_id" = i32, Path, description = "Adventurer ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "Availability with blocking events", body = Availability),
        (status = 400, description = "Invalid period", body = crate::error::ErrorResponse),
        (status = 404, description = "Adventurer not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn check_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(adventurer_id): Path<i32>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Availability>> {
    claims.require_role(ANY_ROLE)?;
    let availability = state
        .services
        .availability
        .check_availability(adventurer_id, period.start_date, period.end_date)
        .await?;
    Ok(Json(availability))
}

/// Day-by-day schedule of an adventurer
#[utoipa::path(
    get,
    path = "/adventurer-availability/{adventurer_id}/schedule",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(
        ("adventurer_id" = i32, Path, description = "Adventurer ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "One entry per day", body = Vec<DaySchedule>),
        (status = 400, description = "Invalid period", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_schedule(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(adventurer_id): Path<i32>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<DaySchedule>>> {
    claims.require_role(ANY_ROLE)?;
    let schedule = state
        .services
        .availability
        .get_schedule(adventurer_id, period.start_date, period.end_date)
        .await?;
    Ok(Json(schedule))
}

/// Adventurers free over a whole period
#[utoipa::path(
    get,
    path = "/adventurer-availability/available",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(PeriodQuery),
    responses(
        (status = 200, description = "Free adventurers", body = Vec<Adventurer>)
    )
)]
pub async fn available_adventurers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<Adventurer>>> {
    claims.require_role(ANY_ROLE)?;
    let adventurers = state
        .services
        .availability
        .find_available_adventurers(period.start_date, period.end_date)
        .await?;
    Ok(Json(adventurers))
}

/// Rest periods of an adventurer
#[utoipa::path(
    get,
    path = "/adventurer-availability/{adventurer_id}/rests",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(("adventurer_id" = i32, Path, description = "Adventurer ID")),
    responses(
        (status = 200, description = "Rest periods", body = Vec<AdventurerRest>)
    )
)]
pub async fn list_rests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(adventurer_id): Path<i32>,
) -> AppResult<Json<Vec<AdventurerRest>>> {
    claims.require_role(ANY_ROLE)?;
    let rests = state.services.availability.find_rests(adventurer_id).await?;
    Ok(Json(rests))
}

/// Book a rest period
#[utoipa::path(
    post,
    path = "/adventurer-availability/rests",
    tag = "availability",
    security(("bearer_auth" = [])),
    request_body = CreateRest,
    responses(
        (status = 201, description = "Rest period created", body = AdventurerRest),
        (status = 400, description = "Invalid or overlapping period", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_rest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRest>,
) -> AppResult<(StatusCode, Json<AdventurerRest>)> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let rest = state.services.availability.create_rest(&data).await?;
    Ok((StatusCode::CREATED, Json(rest)))
}

/// Edit a rest period
#[utoipa::path(
    patch,
    path = "/adventurer-availability/rests/{id}",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Rest period ID")),
    request_body = UpdateRest,
    responses(
        (status = 200, description = "Rest period updated", body = AdventurerRest),
        (status = 404, description = "Rest period not found", body = crate::error::ErrorResponse),
        (status = 400, description = "Invalid or overlapping period", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_rest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateRest>,
) -> AppResult<Json<AdventurerRest>> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let rest = state.services.availability.update_rest(id, &data).await?;
    Ok(Json(rest))
}

/// Cancel a rest period
#[utoipa::path(
    delete,
    path = "/adventurer-availability/rests/{id}",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Rest period ID")),
    responses(
        (status = 204, description = "Rest period deleted"),
        (status = 404, description = "Rest period not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_rest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_role(STAFF)?;
    state.services.availability.delete_rest(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
