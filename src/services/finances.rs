//! Guild ledger service

use crate::{
    error::{AppError, AppResult},
    models::finance::{FinanceStatistics, HistoryQuery, HistoryResponse, Transaction},
    repository::Repository,
};

#[derive(Clone)]
pub struct FinancesService {
    repository: Repository,
}

impl FinancesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_balance(&self) -> AppResult<i64> {
        self.repository.finances_balance().await
    }

    /// Append a manual ledger entry
    pub async fn post_transaction(&self, amount: i64, description: &str) -> AppResult<Transaction> {
        if amount == 0 {
            return Err(AppError::BadRequest("Transaction amount cannot be zero".to_string()));
        }

        let mut tx = self.repository.begin().await?;
        let transaction = self.repository.finances_append(&mut tx, amount, description).await?;
        tx.commit().await?;

        tracing::info!(
            transaction_id = transaction.id,
            amount,
            total = transaction.total,
            "Ledger entry posted"
        );
        Ok(transaction)
    }

    pub async fn get_statistics(&self) -> AppResult<FinanceStatistics> {
        self.repository.finances_statistics().await
    }

    pub async fn get_history(&self, query: &HistoryQuery) -> AppResult<HistoryResponse> {
        let (skip, take) = query.window();
        let (transactions, total_count) = self.repository.finances_history(skip, take).await?;
        Ok(HistoryResponse {
            transactions,
            total_count,
            skip,
            take,
        })
    }
}
