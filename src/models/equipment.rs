//! Equipment definitions and physical stock

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Lifecycle state of a stock item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Available,
    Borrowed,
    Broken,
}

text_enum!(StockStatus {
    Available => "available",
    Borrowed => "borrowed",
    Broken => "broken",
});

/// Equipment definition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    pub equipment_type_id: i32,
    pub max_durability: i32,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub equipment_type_id: i32,
    #[validate(range(min = 1, message = "Max durability must be positive"))]
    pub max_durability: i32,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipment {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub equipment_type_id: Option<i32>,
    #[validate(range(min = 1, message = "Max durability must be positive"))]
    pub max_durability: Option<i32>,
}

/// One physical item of an equipment definition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentStock {
    pub id: i32,
    pub equipment_id: i32,
    pub durability: i32,
    pub status: StockStatus,
}

impl EquipmentStock {
    /// Stock can only be assigned to a quest while it has durability left
    pub fn ensure_assignable(&self) -> AppResult<()> {
        if self.durability <= 0 || self.status == StockStatus::Broken {
            return Err(AppError::BadRequest(format!(
                "Equipment stock {} is broken and cannot be assigned",
                self.id
            )));
        }
        Ok(())
    }
}

/// Durability and status of a stock item after `days` of use
pub fn wear(durability: i32, days: i64) -> (i32, StockStatus) {
    let left = i64::from(durability) - days;
    if left <= 0 {
        (0, StockStatus::Broken)
    } else {
        (left as i32, StockStatus::Available)
    }
}

/// Stock listing filter
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct StockQuery {
    pub status: Option<StockStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(durability: i32, status: StockStatus) -> EquipmentStock {
        EquipmentStock {
            id: 3,
            equipment_id: 1,
            durability,
            status,
        }
    }

    #[test]
    fn zero_durability_is_never_assignable() {
        assert!(matches!(
            stock(0, StockStatus::Available).ensure_assignable(),
            Err(AppError::BadRequest(_))
        ));
        assert!(stock(0, StockStatus::Broken).ensure_assignable().is_err());
        assert!(stock(4, StockStatus::Available).ensure_assignable().is_ok());
    }

    #[test]
    fn wear_breaks_at_zero() {
        assert_eq!(wear(10, 3), (7, StockStatus::Available));
        assert_eq!(wear(3, 3), (0, StockStatus::Broken));
        assert_eq!(wear(2, 5), (0, StockStatus::Broken));
    }
}
