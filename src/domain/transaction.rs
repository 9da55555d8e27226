//! Transaction domain entity.
//! Framework-agnostic representation of a settlement outcome.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::Account;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
    Fee,
    Interest,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Transfer => "Transfer",
            TransactionType::Payment => "Payment",
            TransactionType::Fee => "Fee",
            TransactionType::Interest => "Interest",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deposit" => Ok(TransactionType::Deposit),
            "Withdrawal" => Ok(TransactionType::Withdrawal),
            "Transfer" => Ok(TransactionType::Transfer),
            "Payment" => Ok(TransactionType::Payment),
            "Fee" => Ok(TransactionType::Fee),
            "Interest" => Ok(TransactionType::Interest),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TransactionStatus::Pending),
            "Completed" => Ok(TransactionStatus::Completed),
            "Failed" => Ok(TransactionStatus::Failed),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// A settlement record. Created `Pending` in memory, driven to a terminal
/// status while the remote legs resolve, then persisted exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub reference_number: String,
    pub transaction_type: TransactionType,
    pub amount: BigDecimal,
    pub currency: String,
    pub source_account_id: Uuid,
    pub source_account_number: String,
    pub destination_account_id: Option<Uuid>,
    pub destination_account_number: Option<String>,
    pub status: TransactionStatus,
    pub failure_reason: Option<String>,
    pub description: String,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reference_number: String,
        transaction_type: TransactionType,
        amount: BigDecimal,
        currency: String,
        source: &Account,
        destination: Option<&Account>,
        description: String,
        idempotency_key: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference_number,
            transaction_type,
            amount,
            currency,
            source_account_id: source.id,
            source_account_number: source.account_number.clone(),
            destination_account_id: destination.map(|account| account.id),
            destination_account_number: destination.map(|account| account.account_number.clone()),
            status: TransactionStatus::Pending,
            failure_reason: None,
            description,
            idempotency_key,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Marks the transaction Completed. Terminal statuses are frozen, so this
    /// is a no-op once the transaction has already completed or failed.
    pub fn complete(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TransactionStatus::Completed;
        self.updated_at = Some(Utc::now());
    }

    /// Marks the transaction Failed with a human-readable reason. No-op on a
    /// terminal transaction; the first terminal status wins.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TransactionStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.updated_at = Some(Utc::now());
    }
}
