//! Loads method configuration from TOML with environment overrides.

use crate::domain::config::{MethodConfiguration, MethodConfigurationPatch};
use crate::error::{PaymentError, Result};
use std::path::Path;

pub const ENV_MERCHANT_ID: &str = "BRAINTREE_MERCHANT_ID";
pub const ENV_PUBLIC_KEY: &str = "BRAINTREE_PUBLIC_KEY";
pub const ENV_PRIVATE_KEY: &str = "BRAINTREE_PRIVATE_KEY";

/// Parses a (possibly partial) TOML configuration.
pub fn parse_patch(source: &str) -> Result<MethodConfigurationPatch> {
    toml::from_str(source).map_err(|e| PaymentError::Config(e.to_string()))
}

/// Overrides credentials with non-empty values returned by `lookup`.
pub fn apply_overrides(
    mut patch: MethodConfigurationPatch,
    lookup: impl Fn(&str) -> Option<String>,
) -> MethodConfigurationPatch {
    let value = |name: &str| lookup(name).filter(|v| !v.is_empty());
    if let Some(merchant_id) = value(ENV_MERCHANT_ID) {
        patch.merchant_id = Some(merchant_id);
    }
    if let Some(public_key) = value(ENV_PUBLIC_KEY) {
        patch.public_key = Some(public_key);
    }
    if let Some(private_key) = value(ENV_PRIVATE_KEY) {
        patch.private_key = Some(private_key);
    }
    patch
}

/// Loads the configuration file (if any), applies environment overrides and
/// resolves the result against the static defaults.
pub fn load(path: Option<&Path>) -> Result<MethodConfiguration> {
    let patch = match path {
        Some(path) => parse_patch(&std::fs::read_to_string(path)?)?,
        None => MethodConfigurationPatch::default(),
    };
    let patch = apply_overrides(patch, |name| std::env::var(name).ok());
    Ok(patch.resolve(&MethodConfiguration::default()))
}
