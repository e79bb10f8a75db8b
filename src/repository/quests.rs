//! Quest domain methods on Repository

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        adventurer::Adventurer,
        equipment::EquipmentStock,
        quest::{ConsumableLine, CreateQuest, Quest, QuestConsumable, QuestQuery, QuestStatus, UpdateQuest},
    },
};

/// Join tables linking a quest to plain ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestLink {
    Adventurers,
    EquipmentStocks,
}

impl QuestLink {
    fn table(self) -> &'static str {
        match self {
            QuestLink::Adventurers => "quest_adventurers",
            QuestLink::EquipmentStocks => "quest_stock_equipments",
        }
    }

    fn column(self) -> &'static str {
        match self {
            QuestLink::Adventurers => "adventurer_id",
            QuestLink::EquipmentStocks => "equipment_stock_id",
        }
    }
}

impl Repository {
    /// Search quests with the filters that can run in SQL
    pub async fn quests_search(&self, query: &QuestQuery) -> AppResult<Vec<Quest>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.reward_min.is_some() {
            conditions.push(format!("reward >= ${}", idx));
            idx += 1;
        }
        if query.reward_max.is_some() {
            conditions.push(format!("reward <= ${}", idx));
            idx += 1;
        }
        if query.status_id.is_some() {
            conditions.push(format!("status_id = ${}", idx));
            idx += 1;
        }
        if query.final_date_from.is_some() {
            conditions.push(format!("final_date >= ${}", idx));
            idx += 1;
        }
        if query.final_date_to.is_some() {
            conditions.push(format!("final_date <= ${}", idx));
            idx += 1;
        }
        if query.user_id.is_some() {
            conditions.push(format!("user_id = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let select_q = format!("SELECT * FROM quests {} ORDER BY id DESC", where_clause);
        let mut builder = sqlx::query_as::<_, Quest>(&select_q);
        if let Some(v) = query.reward_min { builder = builder.bind(v); }
        if let Some(v) = query.reward_max { builder = builder.bind(v); }
        if let Some(v) = query.status_id { builder = builder.bind(v); }
        if let Some(v) = query.final_date_from { builder = builder.bind(v); }
        if let Some(v) = query.final_date_to { builder = builder.bind(v); }
        if let Some(v) = query.user_id { builder = builder.bind(v); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Get quest by ID
    pub async fn quests_get_by_id(&self, id: i32) -> AppResult<Quest> {
        sqlx::query_as::<_, Quest>("SELECT * FROM quests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quest {} not found", id)))
    }

    /// Get quest by ID and lock it for the rest of the transaction
    pub async fn quests_get_locked(&self, conn: &mut PgConnection, id: i32) -> AppResult<Quest> {
        sqlx::query_as::<_, Quest>("SELECT * FROM quests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quest {} not found", id)))
    }

    /// Current lifecycle status of a quest
    pub async fn quests_status(&self, conn: &mut PgConnection, quest: &Quest) -> AppResult<QuestStatus> {
        let name: String = sqlx::query_scalar("SELECT name FROM statuses WHERE id = $1")
            .bind(quest.status_id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Quest {} has unknown status {}", quest.id, quest.status_id)))?;
        name.parse().map_err(AppError::Internal)
    }

    /// Adventurers assigned to a quest
    pub async fn quests_adventurers(&self, conn: &mut PgConnection, quest_id: i32) -> AppResult<Vec<Adventurer>> {
        let rows = sqlx::query_as::<_, Adventurer>(
            r#"
            SELECT a.* FROM adventurers a
            JOIN quest_adventurers qa ON qa.adventurer_id = a.id
            WHERE qa.quest_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(quest_id)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Stock items assigned to a quest
    pub async fn quests_equipment_stocks(&self, conn: &mut PgConnection, quest_id: i32) -> AppResult<Vec<EquipmentStock>> {
        let rows = sqlx::query_as::<_, EquipmentStock>(
            r#"
            SELECT s.* FROM equipment_stocks s
            JOIN quest_stock_equipments qse ON qse.equipment_stock_id = s.id
            WHERE qse.quest_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(quest_id)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Consumables reserved for a quest
    pub async fn quests_consumables(&self, conn: &mut PgConnection, quest_id: i32) -> AppResult<Vec<QuestConsumable>> {
        let rows = sqlx::query_as::<_, QuestConsumable>(
            r#"
            SELECT qc.quest_id, qc.consumable_id, c.name, qc.quantity
            FROM quest_consumables qc
            JOIN consumables c ON c.id = qc.consumable_id
            WHERE qc.quest_id = $1
            ORDER BY qc.consumable_id
            "#,
        )
        .bind(quest_id)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Insert a quest in `waiting` status
    pub async fn quests_insert(&self, conn: &mut PgConnection, user_id: i32, data: &CreateQuest) -> AppResult<Quest> {
        let row = sqlx::query_as::<_, Quest>(
            r#"
            INSERT INTO quests (name, description, final_date, reward, estimated_duration,
                                recommended_xp, status_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6,
                    (SELECT id FROM statuses WHERE name = $7), $8)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.final_date)
        .bind(data.reward)
        .bind(data.estimated_duration)
        .bind(data.recommended_xp.unwrap_or(0))
        .bind(QuestStatus::Waiting)
        .bind(user_id)
        .fetch_one(conn)
        .await?;
        Ok(row)
    }

    /// Edit quest fields and send it back to `waiting`
    pub async fn quests_update(&self, conn: &mut PgConnection, id: i32, data: &UpdateQuest) -> AppResult<Quest> {
        let mut sets = vec!["status_id = (SELECT id FROM statuses WHERE name = $1)".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.description, "description");
        add_field!(data.final_date, "final_date");
        add_field!(data.reward, "reward");
        add_field!(data.estimated_duration, "estimated_duration");
        add_field!(data.recommended_xp, "recommended_xp");

        let query = format!("UPDATE quests SET {} WHERE id = ${} RETURNING *", sets.join(", "), idx);

        let mut builder = sqlx::query_as::<_, Quest>(&query).bind(QuestStatus::Waiting);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.description);
        bind_field!(data.final_date);
        bind_field!(data.reward);
        bind_field!(data.estimated_duration);
        bind_field!(data.recommended_xp);

        builder
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quest {} not found", id)))
    }

    /// Move a quest to another status
    pub async fn quests_set_status(&self, conn: &mut PgConnection, id: i32, status: QuestStatus) -> AppResult<Quest> {
        sqlx::query_as::<_, Quest>(
            r#"
            UPDATE quests SET status_id = (SELECT id FROM statuses WHERE name = $2)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quest {} not found", id)))
    }

    /// Stamp the start date of a quest
    pub async fn quests_set_start_date(&self, conn: &mut PgConnection, id: i32, start: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE quests SET start_date = $2 WHERE id = $1")
            .bind(id)
            .bind(start)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Ids currently linked to a quest
    pub async fn quests_linked_ids(&self, conn: &mut PgConnection, link: QuestLink, quest_id: i32) -> AppResult<Vec<i32>> {
        let query = format!(
            "SELECT {col} FROM {table} WHERE quest_id = $1 ORDER BY {col}",
            col = link.column(),
            table = link.table()
        );
        let ids: Vec<i32> = sqlx::query_scalar(&query)
            .bind(quest_id)
            .fetch_all(conn)
            .await?;
        Ok(ids)
    }

    /// Link ids to a quest, skipping existing links
    pub async fn quests_link(&self, conn: &mut PgConnection, link: QuestLink, quest_id: i32, ids: &[i32]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let query = format!(
            "INSERT INTO {table} (quest_id, {col}) SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
            col = link.column(),
            table = link.table()
        );
        sqlx::query(&query).bind(quest_id).bind(ids).execute(conn).await?;
        Ok(())
    }

    /// Unlink ids from a quest
    pub async fn quests_unlink(&self, conn: &mut PgConnection, link: QuestLink, quest_id: i32, ids: &[i32]) -> AppResult<()> {
        let query = format!(
            "DELETE FROM {table} WHERE quest_id = $1 AND {col} = ANY($2)",
            col = link.column(),
            table = link.table()
        );
        sqlx::query(&query).bind(quest_id).bind(ids).execute(conn).await?;
        Ok(())
    }

    /// Remove every link of one kind from a quest
    pub async fn quests_clear_links(&self, conn: &mut PgConnection, link: QuestLink, quest_id: i32) -> AppResult<()> {
        let query = format!("DELETE FROM {} WHERE quest_id = $1", link.table());
        sqlx::query(&query).bind(quest_id).execute(conn).await?;
        Ok(())
    }

    /// Add reserved quantities, merging with existing lines
    pub async fn quests_add_consumables(&self, conn: &mut PgConnection, quest_id: i32, lines: &[ConsumableLine]) -> AppResult<()> {
        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO quest_consumables (quest_id, consumable_id, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (quest_id, consumable_id)
                DO UPDATE SET quantity = quest_consumables.quantity + EXCLUDED.quantity
                "#,
            )
            .bind(quest_id)
            .bind(line.consumable_id)
            .bind(line.quantity)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Subtract reserved quantities, dropping lines that reach zero
    pub async fn quests_remove_consumables(&self, conn: &mut PgConnection, quest_id: i32, lines: &[ConsumableLine]) -> AppResult<()> {
        for line in lines {
            sqlx::query(
                "DELETE FROM quest_consumables WHERE quest_id = $1 AND consumable_id = $2 AND quantity <= $3",
            )
            .bind(quest_id)
            .bind(line.consumable_id)
            .bind(line.quantity)
            .execute(&mut *conn)
            .await?;
            sqlx::query(
                "UPDATE quest_consumables SET quantity = quantity - $3 WHERE quest_id = $1 AND consumable_id = $2 AND quantity > $3",
            )
            .bind(quest_id)
            .bind(line.consumable_id)
            .bind(line.quantity)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Drop every consumable reservation of a quest
    pub async fn quests_clear_consumables(&self, conn: &mut PgConnection, quest_id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM quest_consumables WHERE quest_id = $1")
            .bind(quest_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
