//! Adventurer domain methods on Repository

use sqlx::PgConnection;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        adventurer::{Adventurer, AdventurerQuery, CreateAdventurer, UpdateAdventurer},
        reference::NamedRecord,
    },
};

impl Repository {
    /// Search adventurers with optional filters
    pub async fn adventurers_search(&self, query: &AdventurerQuery) -> AppResult<Vec<Adventurer>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.name.is_some() {
            conditions.push(format!("name ILIKE ${}", idx));
            idx += 1;
        }
        if query.speciality_id.is_some() {
            conditions.push(format!("speciality_id = ${}", idx));
            idx += 1;
        }
        if query.xp_min.is_some() {
            conditions.push(format!("experience >= ${}", idx));
            idx += 1;
        }
        if query.xp_max.is_some() {
            conditions.push(format!("experience <= ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order_clause = match query.daily_rate_order {
            Some(order) => format!("ORDER BY daily_rate {}, id", order.as_sql()),
            None => "ORDER BY id".to_string(),
        };

        let select_q = format!("SELECT * FROM adventurers {} {}", where_clause, order_clause);
        let mut builder = sqlx::query_as::<_, Adventurer>(&select_q);
        if let Some(ref name) = query.name {
            builder = builder.bind(format!("%{}%", name));
        }
        if let Some(speciality_id) = query.speciality_id {
            builder = builder.bind(speciality_id);
        }
        if let Some(xp_min) = query.xp_min {
            builder = builder.bind(xp_min);
        }
        if let Some(xp_max) = query.xp_max {
            builder = builder.bind(xp_max);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Get adventurer by ID
    pub async fn adventurers_get_by_id(&self, id: i32) -> AppResult<Adventurer> {
        sqlx::query_as::<_, Adventurer>("SELECT * FROM adventurers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Adventurer {} not found", id)))
    }

    /// Adventurers among `ids` that exist
    pub async fn adventurers_get_many(&self, ids: &[i32]) -> AppResult<Vec<Adventurer>> {
        let rows = sqlx::query_as::<_, Adventurer>(
            "SELECT * FROM adventurers WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Lock adventurer rows so calendar checks and inserts are serialized
    pub async fn adventurers_lock(&self, conn: &mut PgConnection, ids: &[i32]) -> AppResult<Vec<Adventurer>> {
        let rows = sqlx::query_as::<_, Adventurer>(
            "SELECT * FROM adventurers WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Equipment types an adventurer may use
    pub async fn adventurers_equipment_types(&self, id: i32) -> AppResult<Vec<NamedRecord>> {
        let rows = sqlx::query_as::<_, NamedRecord>(
            r#"
            SELECT et.id, et.name
            FROM adventurer_equipment_types aet
            JOIN equipment_types et ON et.id = aet.equipment_type_id
            WHERE aet.adventurer_id = $1
            ORDER BY et.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Consumable types an adventurer may use
    pub async fn adventurers_consumable_types(&self, id: i32) -> AppResult<Vec<NamedRecord>> {
        let rows = sqlx::query_as::<_, NamedRecord>(
            r#"
            SELECT ct.id, ct.name
            FROM adventurer_consumable_types act
            JOIN consumable_types ct ON ct.id = act.consumable_type_id
            WHERE act.adventurer_id = $1
            ORDER BY ct.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create an adventurer with its allowed types
    pub async fn adventurers_create(&self, data: &CreateAdventurer) -> AppResult<Adventurer> {
        let mut tx = self.pool.begin().await?;

        let adventurer = sqlx::query_as::<_, Adventurer>(
            r#"
            INSERT INTO adventurers (name, daily_rate, experience, speciality_id, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.daily_rate)
        .bind(data.experience.unwrap_or(0))
        .bind(data.speciality_id)
        .bind(&data.image_url)
        .fetch_one(&mut *tx)
        .await?;

        replace_type_links(
            &mut tx,
            adventurer.id,
            Some(data.equipment_type_ids.as_slice()),
            Some(data.consumable_type_ids.as_slice()),
        )
        .await?;

        tx.commit().await?;
        Ok(adventurer)
    }

    /// Update an adventurer; type lists are replaced when provided
    pub async fn adventurers_update(&self, id: i32, data: &UpdateAdventurer) -> AppResult<Adventurer> {
        let mut tx = self.pool.begin().await?;

        let adventurer = sqlx::query_as::<_, Adventurer>(
            r#"
            UPDATE adventurers SET
                name = COALESCE($2, name),
                daily_rate = COALESCE($3, daily_rate),
                experience = COALESCE($4, experience),
                speciality_id = COALESCE($5, speciality_id),
                image_url = COALESCE($6, image_url)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.daily_rate)
        .bind(data.experience)
        .bind(data.speciality_id)
        .bind(&data.image_url)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Adventurer {} not found", id)))?;

        replace_type_links(
            &mut tx,
            id,
            data.equipment_type_ids.as_deref(),
            data.consumable_type_ids.as_deref(),
        )
        .await?;

        tx.commit().await?;
        Ok(adventurer)
    }

    /// Delete an adventurer
    pub async fn adventurers_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM adventurers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Adventurer {} not found", id)));
        }
        Ok(())
    }

    /// Add experience points inside a transaction
    pub async fn adventurers_add_experience(&self, conn: &mut PgConnection, id: i32, xp: i64) -> AppResult<()> {
        sqlx::query("UPDATE adventurers SET experience = experience + $1 WHERE id = $2")
            .bind(i32::try_from(xp).unwrap_or(i32::MAX))
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}

async fn replace_type_links(
    conn: &mut PgConnection,
    adventurer_id: i32,
    equipment_type_ids: Option<&[i32]>,
    consumable_type_ids: Option<&[i32]>,
) -> AppResult<()> {
    if let Some(ids) = equipment_type_ids {
        sqlx::query("DELETE FROM adventurer_equipment_types WHERE adventurer_id = $1")
            .bind(adventurer_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO adventurer_equipment_types (adventurer_id, equipment_type_id)
            SELECT $1, UNNEST($2::int[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(adventurer_id)
        .bind(ids)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(ids) = consumable_type_ids {
        sqlx::query("DELETE FROM adventurer_consumable_types WHERE adventurer_id = $1")
            .bind(adventurer_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO adventurer_consumable_types (adventurer_id, consumable_type_id)
            SELECT $1, UNNEST($2::int[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(adventurer_id)
        .bind(ids)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
