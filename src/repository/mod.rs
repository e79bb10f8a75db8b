//! Repository layer for database operations
//!
//! Each domain file adds an `impl Repository` block with methods prefixed by
//! the domain name. Methods taking a `&mut PgConnection` run inside a
//! transaction opened by the calling service.

pub mod adventurers;
pub mod consumables;
pub mod equipment;
pub mod finances;
pub mod quests;
pub mod reference;
pub mod rests;
pub mod users;

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a database transaction
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
