use super::config::MethodConfiguration;
use serde::{Deserialize, Serialize};

/// Which client-side flow the method renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    CreditCard,
    GooglePay,
}

impl MethodKind {
    pub fn title(&self) -> &'static str {
        match self {
            MethodKind::CreditCard => "Braintree Credit Card",
            MethodKind::GooglePay => "Braintree Google Pay",
        }
    }
}

/// A configured payment method instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentMethod {
    pub pmid: u64,
    /// Site-specific display title, used in logs.
    pub title_specific: String,
    pub kind: MethodKind,
    pub config: MethodConfiguration,
}

impl PaymentMethod {
    pub fn new(pmid: u64, kind: MethodKind, config: MethodConfiguration) -> Self {
        Self {
            pmid,
            title_specific: kind.title().to_string(),
            kind,
            config,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_specific = title.into();
        self
    }
}
