//! Postgres implementation of TransactionRepository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus, TransactionType};
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

const COLUMNS: &str = "id, reference_number, transaction_type, amount, currency, \
    source_account_id, source_account_number, destination_account_id, destination_account_number, \
    status, failure_reason, description, idempotency_key, created_at, updated_at";

/// Postgres-backed transaction repository.
#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let query = format!(
            r#"
            INSERT INTO transactions ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(tx.id)
            .bind(&tx.reference_number)
            .bind(tx.transaction_type.as_str())
            .bind(&tx.amount)
            .bind(&tx.currency)
            .bind(tx.source_account_id)
            .bind(&tx.source_account_number)
            .bind(tx.destination_account_id)
            .bind(&tx.destination_account_number)
            .bind(tx.status.as_str())
            .bind(&tx.failure_reason)
            .bind(&tx.description)
            .bind(&tx.idempotency_key)
            .bind(tx.created_at)
            .bind(tx.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        row.into_domain()
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.ok_or_else(|| RepositoryError::NotFound(id.to_string()))?
            .into_domain()
    }

    async fn get_by_reference(&self, reference: &str) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE reference_number = $1",
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.ok_or_else(|| RepositoryError::NotFound(reference.to_string()))?
            .into_domain()
    }

    async fn find_by_idempotency_key(&self, key: &str) -> RepositoryResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE idempotency_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(|r| r.into_domain()).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        rows.into_iter().map(|r| r.into_domain()).collect()
    }

    async fn list_by_account(&self, account_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions
            WHERE source_account_id = $1 OR destination_account_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        rows.into_iter().map(|r| r.into_domain()).collect()
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    reference_number: String,
    transaction_type: String,
    amount: bigdecimal::BigDecimal,
    currency: String,
    source_account_id: Uuid,
    source_account_number: String,
    destination_account_id: Option<Uuid>,
    destination_account_number: Option<String>,
    status: String,
    failure_reason: Option<String>,
    description: String,
    idempotency_key: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TransactionRow {
    fn into_domain(self) -> RepositoryResult<Transaction> {
        let transaction_type = self
            .transaction_type
            .parse::<TransactionType>()
            .map_err(RepositoryError::Database)?;
        let status = self
            .status
            .parse::<TransactionStatus>()
            .map_err(RepositoryError::Database)?;

        Ok(Transaction {
            id: self.id,
            reference_number: self.reference_number,
            transaction_type,
            amount: self.amount,
            currency: self.currency,
            source_account_id: self.source_account_id,
            source_account_number: self.source_account_number,
            destination_account_id: self.destination_account_id,
            destination_account_number: self.destination_account_number,
            status,
            failure_reason: self.failure_reason,
            description: self.description,
            idempotency_key: self.idempotency_key,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
