use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settlement status a successful synchronous sale is expected to report.
pub const SUBMITTED_FOR_SETTLEMENT: &str = "submitted_for_settlement";

/// A sale as submitted to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRequest {
    pub amount: Decimal,
    pub currency_code: String,
    pub payment_method_nonce: String,
    /// Always carries the nine canonical billing keys.
    pub billing: BTreeMap<String, String>,
    pub customer_email: Option<String>,
    pub submit_for_settlement: bool,
    pub merchant_account_id: Option<String>,
}

/// Outcome reported by the gateway for a sale.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransactionResult {
    pub success: bool,
    pub code: Option<String>,
    pub message: String,
    pub transaction: Option<GatewayTransaction>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GatewayTransaction {
    pub id: String,
    pub status: String,
    pub payment_instrument_type: String,
}

impl TransactionResult {
    /// True only if the call succeeded and the sale was submitted for settlement.
    pub fn is_settled(&self) -> bool {
        self.success
            && self
                .transaction
                .as_ref()
                .is_some_and(|tx| tx.status == SUBMITTED_FOR_SETTLEMENT)
    }

    /// Status code reported in failure logs.
    pub fn status_code(&self) -> &str {
        self.code
            .as_deref()
            .or_else(|| self.transaction.as_ref().map(|tx| tx.status.as_str()))
            .unwrap_or("")
    }
}

/// Short-lived token used by the client-side SDK to initialize hosted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClientToken(pub String);

impl ClientToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
