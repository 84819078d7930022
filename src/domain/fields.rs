//! Declarative billing field table and the prefill/display rules applied to it.

use super::ports::PaymentContext;
use serde::{Deserialize, Serialize};

/// Billing address fields collected on the payment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingField {
    FirstName,
    LastName,
    Company,
    StreetAddress,
    AddressLine2,
    Country,
    Postcode,
    City,
    Region,
}

/// Shipping address fields. Only configurable, never submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingField {
    GivenName,
    Surname,
    StreetAddress,
    ExtendedAddress,
    Line3,
    Locality,
    Region,
    PostalCode,
    Country,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Select,
    Hidden,
}

/// One row of the billing field table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BillingFieldSpec {
    pub field: BillingField,
    pub title: &'static str,
    pub kind: FieldKind,
    /// Name of the field in the gateway's billing address object.
    pub gateway_field: &'static str,
}

pub static BILLING_FIELDS: [BillingFieldSpec; 9] = [
    BillingFieldSpec {
        field: BillingField::FirstName,
        title: "First name",
        kind: FieldKind::Text,
        gateway_field: "firstName",
    },
    BillingFieldSpec {
        field: BillingField::LastName,
        title: "Last name",
        kind: FieldKind::Text,
        gateway_field: "lastName",
    },
    BillingFieldSpec {
        field: BillingField::Company,
        title: "Company",
        kind: FieldKind::Text,
        gateway_field: "company",
    },
    BillingFieldSpec {
        field: BillingField::StreetAddress,
        title: "Address line 1",
        kind: FieldKind::Text,
        gateway_field: "streetAddress",
    },
    BillingFieldSpec {
        field: BillingField::AddressLine2,
        title: "Address line 2",
        kind: FieldKind::Text,
        gateway_field: "extendedAddress",
    },
    BillingFieldSpec {
        field: BillingField::Country,
        title: "Country",
        kind: FieldKind::Select,
        gateway_field: "countryCodeAlpha2",
    },
    BillingFieldSpec {
        field: BillingField::Postcode,
        title: "Postal code",
        kind: FieldKind::Text,
        gateway_field: "postalCode",
    },
    BillingFieldSpec {
        field: BillingField::City,
        title: "City/Locality",
        kind: FieldKind::Text,
        gateway_field: "locality",
    },
    BillingFieldSpec {
        field: BillingField::Region,
        title: "Region/State",
        kind: FieldKind::Text,
        gateway_field: "region",
    },
];

/// Gateway billing keys always present in a submitted billing object.
pub const CANONICAL_BILLING_KEYS: [&str; 9] = [
    "company",
    "countryCodeAlpha2",
    "extendedAddress",
    "firstName",
    "lastName",
    "locality",
    "postalCode",
    "region",
    "streetAddress",
];

impl BillingField {
    pub const ALL: [BillingField; 9] = [
        BillingField::FirstName,
        BillingField::LastName,
        BillingField::Company,
        BillingField::StreetAddress,
        BillingField::AddressLine2,
        BillingField::Country,
        BillingField::Postcode,
        BillingField::City,
        BillingField::Region,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingField::FirstName => "first_name",
            BillingField::LastName => "last_name",
            BillingField::Company => "company",
            BillingField::StreetAddress => "street_address",
            BillingField::AddressLine2 => "address_line2",
            BillingField::Country => "country",
            BillingField::Postcode => "postcode",
            BillingField::City => "city",
            BillingField::Region => "region",
        }
    }

    pub fn spec(&self) -> &'static BillingFieldSpec {
        // The table is ordered like `ALL`.
        &BILLING_FIELDS[*self as usize]
    }
}

impl ShippingField {
    pub const ALL: [ShippingField; 9] = [
        ShippingField::GivenName,
        ShippingField::Surname,
        ShippingField::StreetAddress,
        ShippingField::ExtendedAddress,
        ShippingField::Line3,
        ShippingField::Locality,
        ShippingField::Region,
        ShippingField::PostalCode,
        ShippingField::Country,
    ];
}

/// How a configured field is presented on the payment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "always")]
    Always,
    #[serde(rename = "ifnotset", alias = "if_not_set", alias = "if-not-set")]
    IfNotSet,
}

impl DisplayMode {
    /// Whether a field with the given prefilled value is shown to the user.
    pub fn shows(&self, prefilled: &str) -> bool {
        match self {
            DisplayMode::Always => true,
            DisplayMode::IfNotSet => prefilled.is_empty(),
            DisplayMode::Hidden => false,
        }
    }
}

/// Returns the first non-empty context value for `keys`, scanning in order.
pub fn prefill(keys: &[String], context: &dyn PaymentContext) -> String {
    keys.iter()
        .filter_map(|key| context.value(key))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}
