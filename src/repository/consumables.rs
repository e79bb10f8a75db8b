//! Consumable domain methods on Repository

use sqlx::PgConnection;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        consumable::{Consumable, CreateConsumable, UpdateConsumable},
        quest::QuestStatus,
    },
};

/// Status names whose reservations still count against stock
fn reserving_statuses() -> Vec<String> {
    [
        QuestStatus::Waiting,
        QuestStatus::Validated,
        QuestStatus::Started,
        QuestStatus::Refused,
        QuestStatus::Cancelled,
        QuestStatus::Succeeded,
        QuestStatus::Failed,
    ]
    .into_iter()
    .filter(|s| s.holds_reservations())
    .map(|s| s.to_string())
    .collect()
}

impl Repository {
    /// List all consumables
    pub async fn consumables_list(&self) -> AppResult<Vec<Consumable>> {
        let rows = sqlx::query_as::<_, Consumable>("SELECT * FROM consumables ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get consumable by ID
    pub async fn consumables_get_by_id(&self, id: i32) -> AppResult<Consumable> {
        sqlx::query_as::<_, Consumable>("SELECT * FROM consumables WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Consumable {} not found", id)))
    }

    /// Lock consumable rows for a reservation change
    pub async fn consumables_lock(&self, conn: &mut PgConnection, ids: &[i32]) -> AppResult<Vec<Consumable>> {
        let rows = sqlx::query_as::<_, Consumable>(
            "SELECT * FROM consumables WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Create a consumable
    pub async fn consumables_create(&self, data: &CreateConsumable) -> AppResult<Consumable> {
        let row = sqlx::query_as::<_, Consumable>(
            r#"
            INSERT INTO consumables (name, consumable_type_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.consumable_type_id)
        .bind(data.quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a consumable
    pub async fn consumables_update(&self, id: i32, data: &UpdateConsumable) -> AppResult<Consumable> {
        sqlx::query_as::<_, Consumable>(
            r#"
            UPDATE consumables SET
                name = COALESCE($2, name),
                consumable_type_id = COALESCE($3, consumable_type_id),
                quantity = COALESCE($4, quantity)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.consumable_type_id)
        .bind(data.quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Consumable {} not found", id)))
    }

    /// Delete a consumable
    pub async fn consumables_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM consumables WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Consumable {} not found", id)));
        }
        Ok(())
    }

    /// Add units to the stock counter
    pub async fn consumables_restock(&self, id: i32, quantity: i32) -> AppResult<Consumable> {
        sqlx::query_as::<_, Consumable>(
            "UPDATE consumables SET quantity = quantity + $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Consumable {} not found", id)))
    }

    /// Units of a consumable reserved by quests that still hold stock,
    /// optionally ignoring one quest
    pub async fn consumables_reserved(
        &self,
        conn: &mut PgConnection,
        consumable_id: i32,
        exclude_quest_id: Option<i32>,
    ) -> AppResult<i64> {
        let reserved: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(qc.quantity), 0)::bigint
            FROM quest_consumables qc
            JOIN quests q ON q.id = qc.quest_id
            JOIN statuses s ON s.id = q.status_id
            WHERE qc.consumable_id = $1
              AND s.name = ANY($2)
              AND ($3::int IS NULL OR qc.quest_id <> $3)
            "#,
        )
        .bind(consumable_id)
        .bind(reserving_statuses())
        .bind(exclude_quest_id)
        .fetch_one(conn)
        .await?;
        Ok(reserved)
    }

    /// Remove used units from stock, never below zero
    pub async fn consumables_deduct(&self, conn: &mut PgConnection, id: i32, quantity: i32) -> AppResult<()> {
        sqlx::query("UPDATE consumables SET quantity = GREATEST(quantity - $2, 0) WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .execute(conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_quests_release_their_reservations() {
        let statuses = reserving_statuses();
        assert_eq!(statuses, vec!["waiting", "validated", "started"]);
    }
}
