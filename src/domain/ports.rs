use super::payment::Payment;
use super::transaction::{ClientToken, SaleRequest, TransactionResult};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// The sole channel to the payment gateway.
///
/// Implementations are reusable across calls; credential problems surface on
/// the first call rather than at construction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn client_token(
        &self,
        merchant_account_id: Option<String>,
    ) -> std::result::Result<ClientToken, GatewayError>;

    async fn sale(
        &self,
        request: SaleRequest,
    ) -> std::result::Result<TransactionResult, GatewayError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persists the payment, assigning a `pid` if it has none yet.
    async fn save(&self, payment: &mut Payment) -> Result<()>;
    async fn get(&self, pid: u64) -> Result<Option<Payment>>;
    async fn all(&self) -> Result<Vec<Payment>>;
}

/// Key-based lookups of known customer and order attributes.
pub trait PaymentContext: Send + Sync {
    fn value(&self, key: &str) -> Option<String>;
}

/// A structured error log entry with `@name` placeholders in its template.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub scope: &'static str,
    pub template: &'static str,
    pub variables: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The template with every placeholder substituted.
    ///
    /// Substitution is a single left-to-right scan: the longest name matching
    /// at a position wins and substituted values are never rescanned.
    pub fn render(&self) -> String {
        let mut rendered = String::with_capacity(self.template.len());
        let mut rest = self.template;
        while let Some(at) = rest.find('@') {
            rendered.push_str(&rest[..at]);
            rest = &rest[at..];
            let placeholder = self
                .variables
                .iter()
                .filter(|(name, _)| !name.is_empty() && rest.starts_with(*name))
                .max_by_key(|(name, _)| name.len());
            match placeholder {
                Some((name, value)) => {
                    rendered.push_str(value);
                    rest = &rest[name.len()..];
                }
                None => {
                    rendered.push('@');
                    rest = &rest[1..];
                }
            }
        }
        rendered.push_str(rest);
        rendered
    }
}

pub trait EventLog: Send + Sync {
    fn log(&self, entry: LogEntry);
}

/// Delivers plain user-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type PaymentStoreRef = Arc<dyn PaymentStore>;
pub type EventLogRef = Arc<dyn EventLog>;
pub type NotifierRef = Arc<dyn Notifier>;
