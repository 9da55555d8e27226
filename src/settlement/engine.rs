//! The settlement engine: takes a validated transaction request, drives the
//! remote balance legs against the account service, and records exactly one
//! durable outcome.
//!
//! Remote legs run sequentially within a request; the credit leg of a
//! transfer is only attempted after the debit leg is known to have succeeded.
//! There is no cross-request serialization: two concurrent settlements
//! against one source account can both pass the local funds pre-check.
//! Closing that gap needs a conditional debit primitive on the account
//! service, not more code here.

use bigdecimal::BigDecimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Account, Transaction, TransactionStatus, TransactionType};
use crate::error::AppError;
use crate::ports::{AccountGateway, TransactionRepository};
use crate::settlement::reference::generate_reference_number;
use crate::validation;

#[derive(Debug, Clone)]
pub struct SettlementRequest {
    pub transaction_type: TransactionType,
    pub amount: BigDecimal,
    pub currency: String,
    pub source_account_id: Uuid,
    pub destination_account_id: Option<Uuid>,
    pub description: String,
    pub idempotency_key: Option<String>,
}

#[derive(Clone)]
pub struct SettlementEngine {
    gateway: Arc<dyn AccountGateway>,
    repository: Arc<dyn TransactionRepository>,
}

impl SettlementEngine {
    pub fn new(gateway: Arc<dyn AccountGateway>, repository: Arc<dyn TransactionRepository>) -> Self {
        Self {
            gateway,
            repository,
        }
    }

    /// Settles a transaction request into a terminal Completed/Failed record.
    ///
    /// Validation failures reject the request with no side effects and no
    /// persisted record. Settlement failures (insufficient funds, failed
    /// remote legs, unsupported types) persist a Failed record with a
    /// human-readable reason; nothing is retried.
    pub async fn settle(&self, request: SettlementRequest) -> Result<Transaction, AppError> {
        if validation::validate_positive_amount(&request.amount).is_err() {
            return Err(AppError::Validation(
                "Transaction amount must be greater than zero".to_string(),
            ));
        }

        let currency = validation::sanitize_string(&request.currency);
        validation::validate_currency_code(&currency)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let description = validation::sanitize_string(&request.description);
        validation::validate_max_len("description", &description, validation::DESCRIPTION_MAX_LEN)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // Replay detection happens before any remote effect, so a retried
        // request with the same key never double-applies a delta.
        if let Some(key) = &request.idempotency_key {
            let existing = self
                .repository
                .find_by_idempotency_key(key)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
            if let Some(existing) = existing {
                tracing::info!(
                    "idempotency key {} already settled as {}, returning stored record",
                    key,
                    existing.reference_number
                );
                return Ok(existing);
            }
        }

        let source = self.resolve_source(&request, &currency).await?;
        let destination = match request.transaction_type {
            TransactionType::Transfer => Some(self.resolve_destination(&request, &source).await?),
            TransactionType::Deposit
            | TransactionType::Withdrawal
            | TransactionType::Payment
            | TransactionType::Fee
            | TransactionType::Interest => None,
        };

        let mut tx = Transaction::new(
            generate_reference_number(),
            request.transaction_type,
            request.amount.clone(),
            source.currency.clone(),
            &source,
            destination.as_ref(),
            description,
            request.idempotency_key.clone(),
        );

        match tx.transaction_type {
            TransactionType::Deposit => {
                if let Err(e) = self.gateway.apply_delta(source.id, &tx.amount).await {
                    tracing::warn!("deposit leg failed for {}: {}", tx.reference_number, e);
                    tx.fail("Failed to update account balance");
                }
            }
            TransactionType::Withdrawal => {
                if source.balance < tx.amount {
                    tx.fail("Insufficient funds");
                } else if let Err(e) = self
                    .gateway
                    .apply_delta(source.id, &(-tx.amount.clone()))
                    .await
                {
                    tracing::warn!("withdrawal leg failed for {}: {}", tx.reference_number, e);
                    tx.fail("Failed to update account balance");
                }
            }
            TransactionType::Transfer => match destination.as_ref() {
                // Unreachable after validation; rejected rather than settled
                // so no half-built record is persisted.
                None => {
                    return Err(AppError::Validation(
                        "Destination account is required for transfers".to_string(),
                    ))
                }
                Some(dest) => {
                    if source.balance < tx.amount {
                        tx.fail("Insufficient funds");
                    } else if let Err(e) = self
                        .gateway
                        .apply_delta(source.id, &(-tx.amount.clone()))
                        .await
                    {
                        tracing::warn!(
                            "transfer debit leg failed for {}: {}",
                            tx.reference_number,
                            e
                        );
                        tx.fail("Failed to complete transfer");
                    } else if let Err(e) = self.gateway.apply_delta(dest.id, &tx.amount).await {
                        // The debit already happened and is NOT compensated:
                        // the source account is left short until an operator
                        // reconciles it. This log line is the only signal
                        // that distinguishes the unreconciled case from a
                        // clean failure.
                        tracing::error!(
                            "unreconciled transfer {}: source {} debited {} {} but credit to {} failed: {}",
                            tx.reference_number,
                            source.id,
                            tx.amount,
                            tx.currency,
                            dest.id,
                            e
                        );
                        tx.fail("Failed to complete transfer");
                    }
                }
            },
            TransactionType::Payment | TransactionType::Fee | TransactionType::Interest => {
                tx.fail(format!(
                    "Unsupported transaction type: {}",
                    tx.transaction_type
                ));
            }
        }

        if tx.status != TransactionStatus::Failed {
            tx.complete();
        }

        // Failed settlements are persisted too; the audit trail records
        // every attempt that got past validation.
        let stored = self
            .repository
            .insert(&tx)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        tracing::info!(
            "settled transaction {} ({}) with status {}",
            stored.reference_number,
            stored.transaction_type,
            stored.status
        );

        Ok(stored)
    }

    async fn resolve_source(
        &self,
        request: &SettlementRequest,
        currency: &str,
    ) -> Result<Account, AppError> {
        let source = match self.gateway.fetch_account(request.source_account_id).await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(
                    "failed to resolve source account {}: {}",
                    request.source_account_id,
                    e
                );
                return Err(AppError::Validation("Source account not found".to_string()));
            }
        };

        if !source.is_active {
            return Err(AppError::Validation(
                "Source account is inactive".to_string(),
            ));
        }

        if source.currency != currency {
            return Err(AppError::Validation(
                "Transaction currency does not match source account currency".to_string(),
            ));
        }

        Ok(source)
    }

    async fn resolve_destination(
        &self,
        request: &SettlementRequest,
        source: &Account,
    ) -> Result<Account, AppError> {
        let destination_id = request.destination_account_id.ok_or_else(|| {
            AppError::Validation("Destination account is required for transfers".to_string())
        })?;

        let destination = match self.gateway.fetch_account(destination_id).await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(
                    "failed to resolve destination account {}: {}",
                    destination_id,
                    e
                );
                return Err(AppError::Validation(
                    "Destination account not found".to_string(),
                ));
            }
        };

        if !destination.is_active {
            return Err(AppError::Validation(
                "Destination account is inactive".to_string(),
            ));
        }

        if destination.currency != source.currency {
            return Err(AppError::Validation(
                "Currency mismatch: Cross-currency transfers are not supported".to_string(),
            ));
        }

        Ok(destination)
    }
}
