use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::Transaction;
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

/// A thread-safe in-memory transaction repository.
///
/// Keeps records in insertion order. Used by tests and ephemeral runs where
/// a database is not available.
#[derive(Default, Clone)]
pub struct InMemoryTransactionRepository {
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transactions.read().await.is_empty()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let mut transactions = self.transactions.write().await;
        transactions.push(tx.clone());
        Ok(tx.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction> {
        let transactions = self.transactions.read().await;
        transactions
            .iter()
            .find(|tx| tx.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn get_by_reference(&self, reference: &str) -> RepositoryResult<Transaction> {
        let transactions = self.transactions.read().await;
        transactions
            .iter()
            .find(|tx| tx.reference_number == reference)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(reference.to_string()))
    }

    async fn find_by_idempotency_key(&self, key: &str) -> RepositoryResult<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .iter()
            .find(|tx| tx.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_by_account(&self, account_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .iter()
            .rev()
            .filter(|tx| {
                tx.source_account_id == account_id
                    || tx.destination_account_id == Some(account_id)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, TransactionType};
    use bigdecimal::BigDecimal;

    fn sample_transaction(idempotency_key: Option<String>) -> Transaction {
        let source = Account {
            id: Uuid::new_v4(),
            account_number: "ACC-0001".to_string(),
            account_type: "Checking".to_string(),
            currency: "USD".to_string(),
            balance: BigDecimal::from(100),
            is_active: true,
        };
        let mut tx = Transaction::new(
            "TXN-20260807-0badc0de".to_string(),
            TransactionType::Deposit,
            BigDecimal::from(10),
            "USD".to_string(),
            &source,
            None,
            String::new(),
            idempotency_key,
        );
        tx.complete();
        tx
    }

    #[tokio::test]
    async fn inserts_and_fetches_by_id_and_reference() {
        let repo = InMemoryTransactionRepository::new();
        let tx = sample_transaction(None);
        repo.insert(&tx).await.unwrap();

        assert_eq!(repo.get_by_id(tx.id).await.unwrap().id, tx.id);
        assert_eq!(
            repo.get_by_reference(&tx.reference_number)
                .await
                .unwrap()
                .reference_number,
            tx.reference_number
        );
        assert!(matches!(
            repo.get_by_id(Uuid::new_v4()).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn finds_by_idempotency_key() {
        let repo = InMemoryTransactionRepository::new();
        let tx = sample_transaction(Some("key-1".to_string()));
        repo.insert(&tx).await.unwrap();

        let found = repo.find_by_idempotency_key("key-1").await.unwrap();
        assert_eq!(found.map(|t| t.id), Some(tx.id));
        assert!(repo
            .find_by_idempotency_key("key-2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn lists_newest_first_with_pagination() {
        let repo = InMemoryTransactionRepository::new();
        let first = sample_transaction(None);
        let second = sample_transaction(None);
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        let page = repo.list(1, 0).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, second.id);

        let rest = repo.list(10, 1).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, first.id);
    }

    #[tokio::test]
    async fn lists_by_account_on_either_side() {
        let repo = InMemoryTransactionRepository::new();
        let tx = sample_transaction(None);
        repo.insert(&tx).await.unwrap();

        let by_source = repo.list_by_account(tx.source_account_id).await.unwrap();
        assert_eq!(by_source.len(), 1);

        let unrelated = repo.list_by_account(Uuid::new_v4()).await.unwrap();
        assert!(unrelated.is_empty());
    }
}
