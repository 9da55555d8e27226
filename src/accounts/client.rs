use async_trait::async_trait;
use bigdecimal::BigDecimal;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Account;
use crate::ports::AccountGateway;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("account not found: {0}")]
    NotFound(Uuid),
    #[error("account service rejected the balance update: {0}")]
    Rejected(String),
    #[error("invalid response from account service: {0}")]
    InvalidResponse(String),
    #[error("account service circuit breaker is open")]
    CircuitOpen,
}

/// Wire representation of an account as the account service serves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDto {
    id: Uuid,
    account_number: String,
    #[serde(rename = "type")]
    account_type: String,
    balance: BigDecimal,
    currency: String,
    is_active: bool,
}

impl AccountDto {
    fn into_account(self) -> Account {
        Account {
            id: self.id,
            account_number: self.account_number,
            account_type: self.account_type,
            currency: self.currency,
            balance: self.balance,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
struct DeltaRequest {
    amount: BigDecimal,
}

/// HTTP client for the account service. Performs exactly one network attempt
/// per call: no retries, no backoff, so the settlement engine gets a one-shot
/// fate for every leg it dispatches.
#[derive(Clone)]
pub struct AccountClient {
    client: Client,
    base_url: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl AccountClient {
    /// Creates a new AccountClient with the specified base URL and per-request timeout.
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self::with_circuit_breaker(base_url, timeout, 5, 60)
    }

    /// Creates a new AccountClient with custom circuit breaker configuration.
    pub fn with_circuit_breaker(
        base_url: String,
        timeout: Duration,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        AccountClient {
            client,
            base_url,
            circuit_breaker,
        }
    }

    /// Returns the current state of the circuit breaker.
    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    fn account_url(&self, id: Uuid) -> String {
        format!(
            "{}/api/accounts/{}",
            self.base_url.trim_end_matches('/'),
            id
        )
    }
}

#[async_trait]
impl AccountGateway for AccountClient {
    async fn fetch_account(&self, id: Uuid) -> Result<Account, GatewayError> {
        let url = self.account_url(id);
        let client = self.client.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.get(&url).send().await?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(GatewayError::NotFound(id));
                }

                if !response.status().is_success() {
                    return Err(GatewayError::InvalidResponse(format!(
                        "status {}",
                        response.status().as_u16()
                    )));
                }

                let dto = response.json::<AccountDto>().await?;
                Ok(dto.into_account())
            })
            .await;

        match result {
            Ok(account) => Ok(account),
            Err(FailsafeError::Rejected) => Err(GatewayError::CircuitOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }

    async fn apply_delta(&self, account_id: Uuid, delta: &BigDecimal) -> Result<(), GatewayError> {
        let zero = BigDecimal::from(0);
        if *delta == zero {
            // A zero delta is a caller bug, not something to put on the wire.
            return Err(GatewayError::Rejected("zero balance delta".to_string()));
        }

        let endpoint = if *delta > zero { "deposit" } else { "withdraw" };
        let url = format!("{}/{}", self.account_url(account_id), endpoint);
        let body = DeltaRequest {
            amount: delta.abs(),
        };
        let client = self.client.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.put(&url).json(&body).send().await?;

                if !response.status().is_success() {
                    return Err(GatewayError::Rejected(format!(
                        "status {}",
                        response.status().as_u16()
                    )));
                }

                Ok(())
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(FailsafeError::Rejected) => Err(GatewayError::CircuitOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_client_creation() {
        let client = AccountClient::new(
            "http://localhost:4000".to_string(),
            Duration::from_secs(10),
        );
        assert_eq!(client.base_url, "http://localhost:4000");
    }

    #[test]
    fn test_circuit_breaker_state() {
        let client = AccountClient::new(
            "http://localhost:4000".to_string(),
            Duration::from_secs(10),
        );
        assert_eq!(client.circuit_state(), "closed");
    }

    #[test]
    fn account_url_strips_trailing_slash() {
        let client = AccountClient::new(
            "http://localhost:4000/".to_string(),
            Duration::from_secs(10),
        );
        let id = Uuid::nil();
        assert_eq!(
            client.account_url(id),
            format!("http://localhost:4000/api/accounts/{}", id)
        );
    }

    #[tokio::test]
    async fn zero_delta_is_rejected_without_a_network_call() {
        let client = AccountClient::new(
            "http://localhost:4000".to_string(),
            Duration::from_secs(10),
        );
        let result = client.apply_delta(Uuid::new_v4(), &BigDecimal::from(0)).await;
        assert!(matches!(result, Err(GatewayError::Rejected(_))));
    }
}
