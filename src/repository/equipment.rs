//! Equipment domain methods on Repository

use sqlx::PgConnection;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::equipment::{CreateEquipment, Equipment, EquipmentStock, StockStatus, UpdateEquipment},
};

impl Repository {
    /// List all equipment
    pub async fn equipment_list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn equipment_get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Create equipment
    pub async fn equipment_create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (name, equipment_type_id, max_durability)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.equipment_type_id)
        .bind(data.max_durability)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update equipment
    pub async fn equipment_update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let mut sets = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.equipment_type_id, "equipment_type_id");
        add_field!(data.max_durability, "max_durability");

        if sets.is_empty() {
            return self.equipment_get_by_id(id).await;
        }

        let query = format!("UPDATE equipment SET {} WHERE id = ${} RETURNING *", sets.join(", "), idx);

        let mut builder = sqlx::query_as::<_, Equipment>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.equipment_type_id);
        bind_field!(data.max_durability);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Delete equipment (its stock goes with it)
    pub async fn equipment_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Stock items of one equipment definition
    pub async fn equipment_stocks_for(&self, equipment_id: i32) -> AppResult<Vec<EquipmentStock>> {
        let rows = sqlx::query_as::<_, EquipmentStock>(
            "SELECT * FROM equipment_stocks WHERE equipment_id = $1 ORDER BY id",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All stock items, optionally filtered by status
    pub async fn equipment_stocks_list(&self, status: Option<StockStatus>) -> AppResult<Vec<EquipmentStock>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, EquipmentStock>(
                    "SELECT * FROM equipment_stocks WHERE status = $1 ORDER BY id",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EquipmentStock>("SELECT * FROM equipment_stocks ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Get stock item by ID
    pub async fn equipment_stock_get(&self, id: i32) -> AppResult<EquipmentStock> {
        sqlx::query_as::<_, EquipmentStock>("SELECT * FROM equipment_stocks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment stock {} not found", id)))
    }

    /// Stock items among `ids` that exist
    pub async fn equipment_stocks_get_many(&self, ids: &[i32]) -> AppResult<Vec<EquipmentStock>> {
        let rows = sqlx::query_as::<_, EquipmentStock>(
            "SELECT * FROM equipment_stocks WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Add a stock item at full durability
    pub async fn equipment_stock_create(&self, equipment: &Equipment) -> AppResult<EquipmentStock> {
        let row = sqlx::query_as::<_, EquipmentStock>(
            r#"
            INSERT INTO equipment_stocks (equipment_id, durability, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(equipment.id)
        .bind(equipment.max_durability)
        .bind(StockStatus::Available)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete a stock item
    pub async fn equipment_stock_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment_stocks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment stock {} not found", id)));
        }
        Ok(())
    }

    /// Restore a stock item to its equipment's max durability
    pub async fn equipment_stock_repair(&self, id: i32) -> AppResult<EquipmentStock> {
        sqlx::query_as::<_, EquipmentStock>(
            r#"
            UPDATE equipment_stocks s
            SET durability = e.max_durability, status = $2
            FROM equipment e
            WHERE e.id = s.equipment_id AND s.id = $1
            RETURNING s.*
            "#,
        )
        .bind(id)
        .bind(StockStatus::Available)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment stock {} not found", id)))
    }

    /// Stock items assigned to a quest, locked for the transaction
    pub async fn equipment_stocks_for_quest_locked(
        &self,
        conn: &mut PgConnection,
        quest_id: i32,
    ) -> AppResult<Vec<EquipmentStock>> {
        let rows = sqlx::query_as::<_, EquipmentStock>(
            r#"
            SELECT s.* FROM equipment_stocks s
            JOIN quest_stock_equipments qse ON qse.equipment_stock_id = s.id
            WHERE qse.quest_id = $1
            ORDER BY s.id
            FOR UPDATE OF s
            "#,
        )
        .bind(quest_id)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Write durability and status of a stock item
    pub async fn equipment_stock_set_state(
        &self,
        conn: &mut PgConnection,
        id: i32,
        durability: i32,
        status: StockStatus,
    ) -> AppResult<()> {
        sqlx::query("UPDATE equipment_stocks SET durability = $2, status = $3 WHERE id = $1")
            .bind(id)
            .bind(durability)
            .bind(status)
            .execute(conn)
            .await?;
        Ok(())
    }
}
