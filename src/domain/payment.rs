use crate::error::ValidationError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A positive monetary amount submitted to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidAmount)
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Number of minor-unit digits for an ISO 4217 currency code.
pub fn currency_exponent(code: &str) -> u32 {
    match code {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF" | "UGX"
        | "UYI" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    /// Empty or absent for one-off line items.
    #[serde(default)]
    pub interval_unit: Option<String>,
    #[serde(default)]
    pub interval_value: u32,
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        self.interval_unit
            .as_deref()
            .is_some_and(|unit| !unit.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// Amount times quantity including tax, `InvalidAmount` on overflow.
    pub fn total_amount(&self) -> Result<Decimal, ValidationError> {
        let gross = Decimal::ONE.checked_add(self.tax_rate);
        self.amount
            .checked_mul(Decimal::from(self.quantity))
            .zip(gross)
            .and_then(|(net, gross)| net.checked_mul(gross))
            .ok_or(ValidationError::InvalidAmount)
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.as_ref().is_some_and(Recurrence::is_recurring)
    }
}

/// Data collected by the payment form and consumed by the executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodData {
    /// Single-use token produced by the client-side SDK.
    #[serde(default, rename = "braintree-payment-nonce")]
    pub nonce: String,
    #[serde(default)]
    pub billing_data: BTreeMap<String, String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    New,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::New => "new",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// Gateway details recorded on a successful payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionMetadata {
    pub braintree_id: String,
    pub r#type: String,
    /// Always `None`: subscription plans are not supported.
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub pid: Option<u64>,
    #[serde(default)]
    pub description: String,
    pub currency_code: String,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub method_data: MethodData,
    #[serde(default)]
    pub statuses: Vec<PaymentStatus>,
    #[serde(default)]
    pub braintree: Option<TransactionMetadata>,
}

impl Payment {
    pub fn new(description: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            pid: None,
            description: description.into(),
            currency_code: currency_code.into(),
            line_items: Vec::new(),
            method_data: MethodData::default(),
            statuses: Vec::new(),
            braintree: None,
        }
    }

    /// Total of all line items including tax, rounded to the currency's precision.
    pub fn total_amount(&self) -> Result<Decimal, ValidationError> {
        let total = self
            .line_items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| {
                total
                    .checked_add(item.total_amount()?)
                    .ok_or(ValidationError::InvalidAmount)
            })?;
        Ok(total.round_dp_with_strategy(
            currency_exponent(&self.currency_code),
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    pub fn status(&self) -> PaymentStatus {
        self.statuses.last().copied().unwrap_or_default()
    }

    pub fn set_status(&mut self, status: PaymentStatus) {
        self.statuses.push(status);
    }

    pub fn has_recurring_items(&self) -> bool {
        self.line_items.iter().any(LineItem::is_recurring)
    }
}
