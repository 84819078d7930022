//! Serializable payment form tree handed to the host for rendering.

use super::countries::Country;
use super::fields::FieldKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Name of the hidden element carrying the client-side nonce.
pub const NONCE_FIELD: &str = "braintree-payment-nonce";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    pub title: String,
    pub kind: FieldKind,
    /// Prefilled value, or the fixed value of a hidden field.
    pub value: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_field: Option<&'static str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub options: &'static [Country],
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl FormField {
    pub fn hidden(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            kind: FieldKind::Hidden,
            value: value.into(),
            required: false,
            gateway_field: None,
            options: &[],
            attributes: BTreeMap::new(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.kind == FieldKind::Hidden
    }

    /// Turns the field into a non-interactive element that still carries its value.
    pub fn conceal(&mut self) {
        self.kind = FieldKind::Hidden;
        self.options = &[];
        if let Some(gateway_field) = self.gateway_field {
            self.attributes
                .insert("data-braintree-name".into(), gateway_field.into());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Container {
    pub fields: Vec<FormField>,
}

impl Container {
    pub fn get(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    External,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptGroup {
    Library,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptAttachment {
    pub url: String,
    pub kind: ScriptKind,
    pub group: ScriptGroup,
}

impl ScriptAttachment {
    pub fn library(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: ScriptKind::External,
            group: ScriptGroup::Library,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub currency_code: String,
    pub total_price_status: &'static str,
    pub total_price: String,
}

/// Per-method settings exposed to the client-side script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSettings {
    pub payment_token: String,
    pub pmid: u64,
    #[serde(rename = "transactionInfo", skip_serializing_if = "Option::is_none")]
    pub transaction_info: Option<TransactionInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentForm {
    pub pmid: u64,
    pub nonce: FormField,
    /// Keyed `pmid_<id>`.
    pub settings: BTreeMap<String, ClientSettings>,
    pub scripts: Vec<ScriptAttachment>,
    pub extra_data: Container,
    pub billing_data: Container,
}

impl PaymentForm {
    pub fn settings_key(pmid: u64) -> String {
        format!("pmid_{pmid}")
    }

    pub fn client_settings(&self) -> Option<&ClientSettings> {
        self.settings.get(&Self::settings_key(self.pmid))
    }

    pub fn client_settings_mut(&mut self) -> Option<&mut ClientSettings> {
        self.settings.get_mut(&Self::settings_key(self.pmid))
    }
}

/// Values posted back by the browser, keyed by element name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSubmission {
    pub values: HashMap<String, String>,
}

impl FormSubmission {
    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}
