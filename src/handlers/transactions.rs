use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::domain::TransactionType;
use crate::ports::RepositoryError;
use crate::settlement::SettlementRequest;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTransactionPayload {
    pub transaction_type: TransactionType,
    pub amount: BigDecimal,
    pub currency: String,
    pub source_account_id: Uuid,
    pub destination_account_id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let idempotency_key = headers
        .get("x-idempotency-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let request = SettlementRequest {
        transaction_type: payload.transaction_type,
        amount: payload.amount,
        currency: payload.currency,
        source_account_id: payload.source_account_id,
        destination_account_id: payload.destination_account_id,
        description: payload.description,
        idempotency_key,
    };

    let transaction = state.engine.settle(request).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = state.repository.get_by_id(id).await.map_err(|e| match e {
        RepositoryError::NotFound(_) => {
            AppError::NotFound(format!("Transaction {} not found", id))
        }
        RepositoryError::Database(msg) => AppError::DatabaseError(msg),
    })?;

    Ok(Json(transaction))
}

pub async fn get_transaction_by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = state
        .repository
        .get_by_reference(&reference)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound(_) => {
                AppError::NotFound(format!("Transaction {} not found", reference))
            }
            RepositoryError::Database(msg) => AppError::DatabaseError(msg),
        })?;

    Ok(Json(transaction))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let limit = pagination.limit.unwrap_or(20);
    let offset = pagination.offset.unwrap_or(0);

    let transactions = state
        .repository
        .list(limit, offset)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(Json(transactions))
}

pub async fn list_account_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let transactions = state
        .repository
        .list_by_account(account_id)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(Json(transactions))
}
