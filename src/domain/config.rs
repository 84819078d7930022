//! Typed payment method configuration.
//!
//! Stored configuration is usually partial. It is deserialized into the
//! `*Patch` types and resolved against [`MethodConfiguration::default`], which
//! fills every unset key at every nesting level.

use super::fields::{BillingField, DisplayMode, ShippingField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

/// Presentation and prefill rules for a single form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSettings {
    pub enabled: bool,
    pub display: DisplayMode,
    /// Payment context keys used for prefilling, first match wins.
    pub keys: Vec<String>,
    pub required: bool,
}

impl FieldSettings {
    /// Settings used for a field that has no configuration at all.
    pub fn fallback() -> Self {
        Self {
            enabled: true,
            display: DisplayMode::Hidden,
            keys: Vec::new(),
            required: false,
        }
    }

    fn hidden_with_keys(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::fallback()
        }
    }

    fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::fallback()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSettings {
    pub email: FieldSettings,
    pub billing_address: BTreeMap<BillingField, FieldSettings>,
    pub shipping_address: BTreeMap<ShippingField, FieldSettings>,
}

impl InputSettings {
    pub fn billing(&self, field: BillingField) -> FieldSettings {
        self.billing_address
            .get(&field)
            .cloned()
            .unwrap_or_else(FieldSettings::fallback)
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        let billing_address = BTreeMap::from([
            (
                BillingField::FirstName,
                FieldSettings::hidden_with_keys(&["first_name", "given_name"]),
            ),
            (
                BillingField::LastName,
                FieldSettings::hidden_with_keys(&["last_name"]),
            ),
            (
                BillingField::Company,
                FieldSettings::hidden_with_keys(&["company"]),
            ),
            (
                BillingField::StreetAddress,
                FieldSettings::hidden_with_keys(&["street_address", "address_line2"]),
            ),
            (
                BillingField::AddressLine2,
                FieldSettings::hidden_with_keys(&["address_line2"]),
            ),
            (
                BillingField::Country,
                FieldSettings::hidden_with_keys(&["country"]),
            ),
            (
                BillingField::Postcode,
                FieldSettings::hidden_with_keys(&["postcode", "zip_code"]),
            ),
            (BillingField::City, FieldSettings::hidden_with_keys(&["city"])),
            (
                BillingField::Region,
                FieldSettings::hidden_with_keys(&["region"]),
            ),
        ]);
        let shipping_address = ShippingField::ALL
            .into_iter()
            .map(|field| (field, FieldSettings::disabled()))
            .collect();

        Self {
            email: FieldSettings::hidden_with_keys(&["email"]),
            billing_address,
            shipping_address,
        }
    }
}

/// Fully resolved configuration of one Braintree payment method.
///
/// Immutable for the duration of a request.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodConfiguration {
    pub environment: Environment,
    pub merchant_id: String,
    pub merchant_account_id: String,
    pub public_key: String,
    pub private_key: String,
    pub enable_recurrent_payments: bool,
    pub input_settings: InputSettings,
}

impl Default for MethodConfiguration {
    fn default() -> Self {
        Self {
            environment: Environment::Sandbox,
            merchant_id: String::new(),
            merchant_account_id: String::new(),
            public_key: String::new(),
            private_key: String::new(),
            enable_recurrent_payments: false,
            input_settings: InputSettings::default(),
        }
    }
}

impl MethodConfiguration {
    /// The merchant account override, if one is configured.
    pub fn merchant_account(&self) -> Option<&str> {
        Some(self.merchant_account_id.as_str()).filter(|id| !id.is_empty())
    }

    pub fn credentials(&self) -> GatewayCredentials {
        GatewayCredentials {
            environment: self.environment,
            merchant_id: self.merchant_id.clone(),
            public_key: self.public_key.clone(),
            private_key: self.private_key.clone(),
        }
    }
}

impl fmt::Debug for MethodConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodConfiguration")
            .field("environment", &self.environment)
            .field("merchant_id", &self.merchant_id)
            .field("merchant_account_id", &self.merchant_account_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("enable_recurrent_payments", &self.enable_recurrent_payments)
            .field("input_settings", &self.input_settings)
            .finish()
    }
}

/// Parameters the gateway client is bound to.
#[derive(Clone, PartialEq)]
pub struct GatewayCredentials {
    pub environment: Environment,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("environment", &self.environment)
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettingsPatch {
    pub enabled: Option<bool>,
    pub display: Option<DisplayMode>,
    pub keys: Option<Vec<String>>,
    pub required: Option<bool>,
}

impl FieldSettingsPatch {
    pub fn resolve(self, defaults: &FieldSettings) -> FieldSettings {
        FieldSettings {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            display: self.display.unwrap_or(defaults.display),
            keys: self.keys.unwrap_or_else(|| defaults.keys.clone()),
            required: self.required.unwrap_or(defaults.required),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettingsPatch {
    pub email: Option<FieldSettingsPatch>,
    pub billing_address: BTreeMap<BillingField, FieldSettingsPatch>,
    pub shipping_address: BTreeMap<ShippingField, FieldSettingsPatch>,
}

impl InputSettingsPatch {
    pub fn resolve(self, defaults: &InputSettings) -> InputSettings {
        let mut resolved = defaults.clone();
        if let Some(email) = self.email {
            resolved.email = email.resolve(&defaults.email);
        }
        for (field, patch) in self.billing_address {
            let settings = patch.resolve(&defaults.billing(field));
            resolved.billing_address.insert(field, settings);
        }
        for (field, patch) in self.shipping_address {
            let base = defaults
                .shipping_address
                .get(&field)
                .cloned()
                .unwrap_or_else(FieldSettings::disabled);
            resolved.shipping_address.insert(field, patch.resolve(&base));
        }
        resolved
    }
}

/// Stored, possibly partial, method configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodConfigurationPatch {
    pub environment: Option<Environment>,
    pub merchant_id: Option<String>,
    pub merchant_account_id: Option<String>,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
    pub enable_recurrent_payments: Option<bool>,
    pub input_settings: Option<InputSettingsPatch>,
}

impl MethodConfigurationPatch {
    /// Merges this patch over `defaults`. Set values win, unset ones fall back.
    pub fn resolve(self, defaults: &MethodConfiguration) -> MethodConfiguration {
        MethodConfiguration {
            environment: self.environment.unwrap_or(defaults.environment),
            merchant_id: self
                .merchant_id
                .unwrap_or_else(|| defaults.merchant_id.clone()),
            merchant_account_id: self
                .merchant_account_id
                .unwrap_or_else(|| defaults.merchant_account_id.clone()),
            public_key: self
                .public_key
                .unwrap_or_else(|| defaults.public_key.clone()),
            private_key: self
                .private_key
                .unwrap_or_else(|| defaults.private_key.clone()),
            enable_recurrent_payments: self
                .enable_recurrent_payments
                .unwrap_or(defaults.enable_recurrent_payments),
            input_settings: match self.input_settings {
                Some(patch) => patch.resolve(&defaults.input_settings),
                None => defaults.input_settings.clone(),
            },
        }
    }
}
