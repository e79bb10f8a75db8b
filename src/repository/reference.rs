//! Reference data methods on Repository, generic over the table

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::reference::{NamedRecord, ReferenceKind},
};

impl Repository {
    /// List all rows of a reference table
    pub async fn reference_list<K: ReferenceKind>(&self) -> AppResult<Vec<NamedRecord>> {
        let query = format!("SELECT id, name FROM {} ORDER BY id", K::TABLE);
        let rows = sqlx::query_as::<_, NamedRecord>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a reference row by ID
    pub async fn reference_get<K: ReferenceKind>(&self, id: i32) -> AppResult<NamedRecord> {
        let query = format!("SELECT id, name FROM {} WHERE id = $1", K::TABLE);
        sqlx::query_as::<_, NamedRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", K::LABEL, id)))
    }

    /// Check whether a name is taken, optionally ignoring one row
    pub async fn reference_name_exists<K: ReferenceKind>(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE LOWER(name) = LOWER($1) AND ($2::int IS NULL OR id <> $2))",
            K::TABLE
        );
        let exists: bool = sqlx::query_scalar(&query)
            .bind(name)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Ids of `ids` that exist in the table
    pub async fn reference_existing_ids<K: ReferenceKind>(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let query = format!("SELECT id FROM {} WHERE id = ANY($1)", K::TABLE);
        let found: Vec<i32> = sqlx::query_scalar(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(found)
    }

    /// Create a reference row
    pub async fn reference_create<K: ReferenceKind>(&self, name: &str) -> AppResult<NamedRecord> {
        let query = format!("INSERT INTO {} (name) VALUES ($1) RETURNING id, name", K::TABLE);
        let row = sqlx::query_as::<_, NamedRecord>(&query)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Rename a reference row
    pub async fn reference_update<K: ReferenceKind>(&self, id: i32, name: &str) -> AppResult<NamedRecord> {
        let query = format!("UPDATE {} SET name = $1 WHERE id = $2 RETURNING id, name", K::TABLE);
        sqlx::query_as::<_, NamedRecord>(&query)
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", K::LABEL, id)))
    }

    /// Delete a reference row
    pub async fn reference_delete<K: ReferenceKind>(&self, id: i32) -> AppResult<()> {
        let query = format!("DELETE FROM {} WHERE id = $1", K::TABLE);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", K::LABEL, id)));
        }
        Ok(())
    }
}
