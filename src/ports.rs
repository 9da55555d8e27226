//! Boundary traits for the settlement engine's two collaborators: the
//! account-owning service (reached over the network) and the durable
//! transaction record store.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

use crate::accounts::GatewayError;
use crate::domain::{Account, Transaction};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction>;
    async fn get_by_reference(&self, reference: &str) -> RepositoryResult<Transaction>;
    async fn find_by_idempotency_key(&self, key: &str) -> RepositoryResult<Option<Transaction>>;
    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Transaction>>;
    async fn list_by_account(&self, account_id: Uuid) -> RepositoryResult<Vec<Transaction>>;
}

/// Client-side view of the account service. One network attempt per call;
/// every failure mode surfaces as a `GatewayError` so the engine always has
/// a deterministic fate for each leg.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    async fn fetch_account(&self, id: Uuid) -> Result<Account, GatewayError>;

    /// Applies a signed balance delta: positive credits the account,
    /// negative debits it. The account service applies each delta atomically
    /// or not at all.
    async fn apply_delta(&self, account_id: Uuid, delta: &BigDecimal) -> Result<(), GatewayError>;
}
