//! Adventurer model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::reference::NamedRecord;

/// Adventurer row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Adventurer {
    pub id: i32,
    pub name: String,
    pub daily_rate: i32,
    pub experience: i32,
    pub speciality_id: i32,
    pub image_url: Option<String>,
}

/// Adventurer with speciality and allowed gear
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdventurerDetails {
    #[serde(flatten)]
    pub adventurer: Adventurer,
    pub speciality: NamedRecord,
    pub equipment_types: Vec<NamedRecord>,
    pub consumable_types: Vec<NamedRecord>,
}

/// Create adventurer request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdventurer {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
    pub speciality_id: i32,
    #[validate(range(min = 0, message = "Daily rate cannot be negative"))]
    pub daily_rate: i32,
    #[validate(range(min = 0, message = "Experience cannot be negative"))]
    pub experience: Option<i32>,
    #[serde(default)]
    pub equipment_type_ids: Vec<i32>,
    #[serde(default)]
    pub consumable_type_ids: Vec<i32>,
}

/// Update adventurer request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdventurer {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
    pub speciality_id: Option<i32>,
    #[validate(range(min = 0, message = "Daily rate cannot be negative"))]
    pub daily_rate: Option<i32>,
    #[validate(range(min = 0, message = "Experience cannot be negative"))]
    pub experience: Option<i32>,
    pub equipment_type_ids: Option<Vec<i32>>,
    pub consumable_type_ids: Option<Vec<i32>>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Adventurer list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdventurerQuery {
    /// Case-insensitive name search
    pub name: Option<String>,
    pub speciality_id: Option<i32>,
    pub xp_min: Option<i32>,
    pub xp_max: Option<i32>,
    pub daily_rate_order: Option<SortOrder>,
}
