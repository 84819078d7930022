use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised before any gateway call is attempted.
///
/// These are hard stops: the payment is neither persisted nor submitted.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("The Braintree gateway client could not be initialized.")]
    GatewayUnavailable,
    #[error("Recurrent payments are disabled for this payment method.")]
    RecurringPaymentsDisabled,
    #[error("The payment total must be positive and representable")]
    InvalidAmount,
    #[error("Unsupported currency code: {0}")]
    InvalidCurrency(String),
    #[error("The payment has no line items.")]
    NoLineItems,
    #[error("No payment method nonce was submitted.")]
    MissingNonce,
    #[error("{0}")]
    Fields(FormErrors),
}

/// Failures reported by the gateway client itself, as opposed to a declined
/// transaction which is an ordinary [`TransactionResult`](crate::domain::transaction::TransactionResult).
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Authentication with the gateway failed (HTTP {0})")]
    Authentication(u16),
    #[error("Unexpected gateway response (HTTP {status}): {message}")]
    UnexpectedResponse { status: u16, message: String },
    #[error("The gateway rejected the request: {0}")]
    Rejected(String),
    #[error("Malformed gateway response: {0}")]
    Malformed(String),
}

/// A single inline error attached to a form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field errors collected while validating one form submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join(" "))
    }
}
