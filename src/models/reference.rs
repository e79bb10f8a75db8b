//! Named reference data (specialities, equipment types, consumable types,
//! quest statuses, roles)
//!
//! Every reference table has the same `(id, name)` shape, so a single
//! [`NamedRecord`] row type is shared and each table is bound through a
//! [`ReferenceKind`] marker.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A row of any reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NamedRecord {
    pub id: i32,
    pub name: String,
}

/// Create or rename request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NameInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Binding of a reference table to its SQL table and display label
pub trait ReferenceKind: Send + Sync + 'static {
    const TABLE: &'static str;
    const LABEL: &'static str;
}

pub struct Speciality;
pub struct EquipmentType;
pub struct ConsumableType;
pub struct Status;
pub struct RoleKind;

impl ReferenceKind for Speciality {
    const TABLE: &'static str = "specialities";
    const LABEL: &'static str = "Speciality";
}

impl ReferenceKind for EquipmentType {
    const TABLE: &'static str = "equipment_types";
    const LABEL: &'static str = "Equipment type";
}

impl ReferenceKind for ConsumableType {
    const TABLE: &'static str = "consumable_types";
    const LABEL: &'static str = "Consumable type";
}

impl ReferenceKind for Status {
    const TABLE: &'static str = "statuses";
    const LABEL: &'static str = "Status";
}

impl ReferenceKind for RoleKind {
    const TABLE: &'static str = "roles";
    const LABEL: &'static str = "Role";
}
