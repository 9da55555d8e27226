//! Account as seen from the settlement side.
//! The account service owns the record; this is a read-only view resolved
//! through the gateway client. Balances are only ever changed by asking the
//! account service to apply a signed delta, never by writing this struct back.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub account_number: String,
    pub account_type: String,
    pub currency: String,
    pub balance: BigDecimal,
    pub is_active: bool,
}
