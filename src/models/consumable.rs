//! Consumable stock

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Depletable consumable stock
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Consumable {
    pub id: i32,
    pub name: String,
    pub consumable_type_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsumable {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub consumable_type_id: i32,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConsumable {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub consumable_type_id: Option<i32>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
}

/// Restock request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct Restock {
    #[validate(range(min = 1, max = 1000000, message = "Quantity must be between 1 and 1000000"))]
    pub quantity: i32,
}

/// Fails when `requested` exceeds what is left once other reservations are
/// taken into account.
pub fn ensure_available(consumable: &Consumable, reserved: i64, requested: i64) -> AppResult<()> {
    let remaining = i64::from(consumable.quantity) - reserved;
    if remaining < requested {
        return Err(AppError::BadRequest(format!(
            "Insufficient stock for consumable {}: {} remaining, {} requested",
            consumable.id,
            remaining.max(0),
            requested
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn potion(quantity: i32) -> Consumable {
        Consumable {
            id: 1,
            name: "Healing potion".to_string(),
            consumable_type_id: 1,
            quantity,
        }
    }

    #[test]
    fn exact_remaining_stock_can_be_reserved() {
        assert!(ensure_available(&potion(10), 4, 6).is_ok());
    }

    #[test]
    fn over_reservation_is_rejected() {
        assert!(matches!(
            ensure_available(&potion(10), 4, 7),
            Err(AppError::BadRequest(_))
        ));
        assert!(ensure_available(&potion(0), 0, 1).is_err());
    }

    #[test]
    fn restock_quantity_is_capped() {
        assert!(Restock { quantity: i32::MAX }.validate().is_err());
        assert!(Restock { quantity: 0 }.validate().is_err());
        assert!(Restock { quantity: 40 }.validate().is_ok());
    }
}
