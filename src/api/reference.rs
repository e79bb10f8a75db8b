//! Reference data endpoints (specialities, equipment types, consumable types,
//! statuses, roles)
//!
//! All five tables share one set of handlers, bound per table through
//! [`ReferenceRoute`].

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        reference::{ConsumableType, EquipmentType, NameInput, NamedRecord, ReferenceKind, RoleKind, Speciality, Status},
        user::{ANY_ROLE, STAFF},
    },
    services::{reference::ReferenceService, Services},
    AppState,
};

use super::{
    extract::{Json, Path},
    AuthenticatedUser,
};

/// Reference table reachable over HTTP
pub trait ReferenceRoute: ReferenceKind + Sized {
    fn service(services: &Services) -> &ReferenceService<Self>;
}

impl ReferenceRoute for Speciality {
    fn service(services: &Services) -> &ReferenceService<Self> {
        &services.specialities
    }
}

impl ReferenceRoute for EquipmentType {
    fn service(services: &Services) -> &ReferenceService<Self> {
        &services.equipment_types
    }
}

impl ReferenceRoute for ConsumableType {
    fn service(services: &Services) -> &ReferenceService<Self> {
        &services.consumable_types
    }
}

impl ReferenceRoute for Status {
    fn service(services: &Services) -> &ReferenceService<Self> {
        &services.statuses
    }
}

impl ReferenceRoute for RoleKind {
    fn service(services: &Services) -> &ReferenceService<Self> {
        &services.roles
    }
}

/// `GET/POST /` and `GET/PATCH/DELETE /:id` for one table
pub fn routes<K: ReferenceRoute>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<K>).post(create::<K>))
        .route("/:id", get(get_one::<K>).patch(update::<K>).delete(remove::<K>))
}

async fn list<K: ReferenceRoute>(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<NamedRecord>>> {
    claims.require_role(ANY_ROLE)?;
    let records = K::service(&state.services).find_all().await?;
    Ok(Json(records))
}

async fn get_one<K: ReferenceRoute>(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<NamedRecord>> {
    claims.require_role(ANY_ROLE)?;
    let record = K::service(&state.services).find_one(id).await?;
    Ok(Json(record))
}

async fn create<K: ReferenceRoute>(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<NameInput>,
) -> AppResult<(StatusCode, Json<NamedRecord>)> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let record = K::service(&state.services).create(&data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update<K: ReferenceRoute>(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<NameInput>,
) -> AppResult<Json<NamedRecord>> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let record = K::service(&state.services).update(id, &data).await?;
    Ok(Json(record))
}

async fn remove<K: ReferenceRoute>(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_role(STAFF)?;
    K::service(&state.services).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
