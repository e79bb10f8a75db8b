//! Ledger methods on Repository

use sqlx::{PgConnection, Row};

use super::Repository;
use crate::{
    error::AppResult,
    models::finance::{FinanceStatistics, Transaction},
};

impl Repository {
    /// Running total of the latest ledger row, 0 when empty
    pub async fn finances_balance(&self) -> AppResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT total FROM transactions ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(total.unwrap_or(0))
    }

    /// Append a ledger row; its total carries on from the previous row
    pub async fn finances_append(
        &self,
        conn: &mut PgConnection,
        amount: i64,
        description: &str,
    ) -> AppResult<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (amount, description, date, total)
            SELECT $1, $2, NOW(),
                   COALESCE((SELECT total FROM transactions ORDER BY id DESC LIMIT 1), 0) + $1
            RETURNING *
            "#,
        )
        .bind(amount)
        .bind(description)
        .fetch_one(conn)
        .await?;
        Ok(row)
    }

    /// Income, expenses, balance and row count
    pub async fn finances_statistics(&self) -> AppResult<FinanceStatistics> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE amount > 0), 0)::bigint AS total_income,
                COALESCE(-SUM(amount) FILTER (WHERE amount < 0), 0)::bigint AS total_expenses,
                COUNT(*) AS transaction_count
            FROM transactions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let balance = self.finances_balance().await?;

        Ok(FinanceStatistics {
            total_income: row.get("total_income"),
            total_expenses: row.get("total_expenses"),
            balance,
            transaction_count: row.get("transaction_count"),
        })
    }

    /// One page of the ledger, newest first, with the total row count
    pub async fn finances_history(&self, skip: i64, take: i64) -> AppResult<(Vec<Transaction>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions ORDER BY date DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(take)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
