//! Guild ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Default and maximum page sizes for the history
pub const DEFAULT_HISTORY_TAKE: i64 = 50;
pub const MAX_HISTORY_TAKE: i64 = 100;

/// Ledger row; `total` is the balance after this entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: i32,
    pub amount: i64,
    pub description: String,
    pub date: DateTime<Utc>,
    pub total: i64,
}

/// Manual ledger entry
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransaction {
    pub amount: i64,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceStatistics {
    pub total_income: i64,
    /// Sum of debits, as a positive number
    pub total_expenses: i64,
    pub balance: i64,
    pub transaction_count: i64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

impl HistoryQuery {
    /// Normalized `(skip, take)`
    pub fn window(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let take = self
            .take
            .unwrap_or(DEFAULT_HISTORY_TAKE)
            .clamp(1, MAX_HISTORY_TAKE);
        (skip, take)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub transactions: Vec<Transaction>,
    pub total_count: i64,
    pub skip: i64,
    pub take: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_window_defaults_and_caps() {
        let query = HistoryQuery { skip: None, take: None };
        assert_eq!(query.window(), (0, DEFAULT_HISTORY_TAKE));

        let query = HistoryQuery { skip: Some(-5), take: Some(1000) };
        assert_eq!(query.window(), (0, MAX_HISTORY_TAKE));

        let query = HistoryQuery { skip: Some(20), take: Some(25) };
        assert_eq!(query.window(), (20, 25));
    }
}
