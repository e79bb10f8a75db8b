//! Rest period and availability methods on Repository

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        adventurer::Adventurer,
        rest::{AdventurerRest, CreateRest, RestType, ScheduleEvent},
    },
};

impl Repository {
    /// Rest periods of an adventurer, by start date
    pub async fn rests_list_by_adventurer(&self, adventurer_id: i32) -> AppResult<Vec<AdventurerRest>> {
        let rows = sqlx::query_as::<_, AdventurerRest>(
            "SELECT * FROM adventurer_rests WHERE adventurer_id = $1 ORDER BY start_date, id",
        )
        .bind(adventurer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get rest period by ID
    pub async fn rests_get_by_id(&self, id: i32) -> AppResult<AdventurerRest> {
        sqlx::query_as::<_, AdventurerRest>("SELECT * FROM adventurer_rests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rest period {} not found", id)))
    }

    /// Rest periods of an adventurer meeting `[start, end]` (closed interval)
    pub async fn rests_overlapping(
        &self,
        adventurer_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> AppResult<Vec<AdventurerRest>> {
        let mut conn = self.pool.acquire().await?;
        self.rests_overlapping_in(&mut conn, adventurer_id, start, end, exclude_id).await
    }

    /// Same as [`Repository::rests_overlapping`], on a caller-held connection
    pub async fn rests_overlapping_in(
        &self,
        conn: &mut PgConnection,
        adventurer_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> AppResult<Vec<AdventurerRest>> {
        let rows = sqlx::query_as::<_, AdventurerRest>(
            r#"
            SELECT * FROM adventurer_rests
            WHERE adventurer_id = $1
              AND start_date <= $3
              AND end_date >= $2
              AND ($4::int IS NULL OR id <> $4)
            ORDER BY start_date, id
            "#,
        )
        .bind(adventurer_id)
        .bind(start)
        .bind(end)
        .bind(exclude_id)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Calendar events of an adventurer meeting `[start, end]`, with the
    /// name of the quest behind each mission
    pub async fn rests_schedule_events(
        &self,
        adventurer_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<ScheduleEvent>> {
        let rows = sqlx::query_as::<_, ScheduleEvent>(
            r#"
            SELECT r.id, r.start_date, r.end_date, r.type, r.reason, r.quest_id,
                   q.name AS quest_name
            FROM adventurer_rests r
            LEFT JOIN quests q ON q.id = r.quest_id
            WHERE r.adventurer_id = $1
              AND r.start_date <= $3
              AND r.end_date >= $2
            ORDER BY r.start_date, r.id
            "#,
        )
        .bind(adventurer_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a rest period
    pub async fn rests_create(&self, data: &CreateRest) -> AppResult<AdventurerRest> {
        let row = sqlx::query_as::<_, AdventurerRest>(
            r#"
            INSERT INTO adventurer_rests (adventurer_id, start_date, end_date, reason, type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.adventurer_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(&data.reason)
        .bind(data.rest_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Overwrite a rest period with already merged values
    pub async fn rests_update(&self, rest: &AdventurerRest) -> AppResult<AdventurerRest> {
        sqlx::query_as::<_, AdventurerRest>(
            r#"
            UPDATE adventurer_rests
            SET start_date = $2, end_date = $3, reason = $4, type = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(rest.id)
        .bind(rest.start_date)
        .bind(rest.end_date)
        .bind(&rest.reason)
        .bind(rest.rest_type)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Rest period {} not found", rest.id)))
    }

    /// Delete a rest period
    pub async fn rests_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM adventurer_rests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Rest period {} not found", id)));
        }
        Ok(())
    }

    /// Block an adventurer's calendar for a running quest
    pub async fn rests_insert_mission(
        &self,
        conn: &mut PgConnection,
        adventurer_id: i32,
        quest_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reason: &str,
    ) -> AppResult<AdventurerRest> {
        let row = sqlx::query_as::<_, AdventurerRest>(
            r#"
            INSERT INTO adventurer_rests (adventurer_id, start_date, end_date, reason, type, quest_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(adventurer_id)
        .bind(start)
        .bind(end)
        .bind(reason)
        .bind(RestType::Mission)
        .bind(quest_id)
        .fetch_one(conn)
        .await?;
        Ok(row)
    }

    /// Remove the mission blocks created when a quest started
    pub async fn rests_delete_missions_for_quest(&self, conn: &mut PgConnection, quest_id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM adventurer_rests WHERE quest_id = $1 AND type = $2")
            .bind(quest_id)
            .bind(RestType::Mission)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Adventurers with no rest and no validated or running quest meeting
    /// `[start, end]`. A quest occupies `estimated_duration` days from its
    /// start date, or from its final date while not started.
    pub async fn rests_free_adventurers(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Vec<Adventurer>> {
        let rows = sqlx::query_as::<_, Adventurer>(
            r#"
            SELECT a.* FROM adventurers a
            WHERE NOT EXISTS (
                SELECT 1 FROM adventurer_rests r
                WHERE r.adventurer_id = a.id
                  AND r.start_date <= $2
                  AND r.end_date >= $1
            )
            AND NOT EXISTS (
                SELECT 1 FROM quest_adventurers qa
                JOIN quests q ON q.id = qa.quest_id
                JOIN statuses s ON s.id = q.status_id
                WHERE qa.adventurer_id = a.id
                  AND s.name IN ('validated', 'started')
                  AND COALESCE(q.start_date, q.final_date) <= $2
                  AND COALESCE(q.start_date, q.final_date)
                      + make_interval(days => q.estimated_duration) >= $1
            )
            ORDER BY a.id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
