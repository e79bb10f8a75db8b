//! Guild ledger endpoints (staff only)

use axum::{
    extract::State,
    http::StatusCode,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        finance::{BalanceResponse, CreateTransaction, FinanceStatistics, HistoryQuery, HistoryResponse, Transaction},
        user::STAFF,
    },
};

use super::{
    extract::{Json, Query},
    AuthenticatedUser,
};

/// Current balance
#[utoipa::path(
    get,
    path = "/finances/balance",
    tag = "finances",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Balance after the latest entry", body = BalanceResponse)
    )
)]
pub async fn get_balance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<BalanceResponse>> {
    claims.require_role(STAFF)?;
    let balance = state.services.finances.get_balance().await?;
    Ok(Json(BalanceResponse { balance }))
}

/// Post a manual ledger entry
#[utoipa::path(
    post,
    path = "/finances/transactions",
    tag = "finances",
    security(("bearer_auth" = [])),
    request_body = CreateTransaction,
    responses(
        (status = 201, description = "Entry recorded", body = Transaction),
        (status = 400, description = "Invalid amount", body = crate::error::ErrorResponse)
    )
)]
pub async fn post_transaction(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateTransaction>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    claims.require_role(STAFF)?;
    data.validate()?;
    let transaction = state
        .services
        .finances
        .post_transaction(data.amount, &data.description)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Income and expense totals
#[utoipa::path(
    get,
    path = "/finances/statistics",
    tag = "finances",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ledger statistics", body = FinanceStatistics)
    )
)]
pub async fn get_statistics(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<FinanceStatistics>> {
    claims.require_role(STAFF)?;
    let statistics = state.services.finances.get_statistics().await?;
    Ok(Json(statistics))
}

/// Paginated ledger, newest first
#[utoipa::path(
    get,
    path = "/finances/history",
    tag = "finances",
    security(("bearer_auth" = [])),
    params(HistoryQuery),
    responses(
        (status = 200, description = "Ledger page", body = HistoryResponse)
    )
)]
pub async fn get_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    claims.require_role(STAFF)?;
    let history = state.services.finances.get_history(&query).await?;
    Ok(Json(history))
}
