//! Payment form rendering and submission handling.

use crate::domain::config::{FieldSettings, InputSettings};
use crate::domain::countries::{COUNTRIES, is_country_code};
use crate::domain::fields::{BILLING_FIELDS, BillingFieldSpec, CANONICAL_BILLING_KEYS, FieldKind, prefill};
use crate::domain::form::{
    ClientSettings, Container, FormField, FormSubmission, NONCE_FIELD, PaymentForm,
    ScriptAttachment, ScriptGroup, ScriptKind, TransactionInfo,
};
use crate::domain::method::{MethodKind, PaymentMethod};
use crate::domain::payment::Payment;
use crate::domain::ports::PaymentContext;
use crate::domain::transaction::ClientToken;
use crate::error::{FormErrors, ValidationError};
use std::collections::BTreeMap;

pub const JS_SDK_VERSION: &str = "3.50.0";
pub const GOOGLE_PAY_JS: &str = "https://pay.google.com/gp/p/js/pay.js";
/// Module script wiring hosted fields to the form.
pub const MODULE_SCRIPT: &str = "braintree.js";

const JS_BASE_URL: &str = "https://js.braintreegateway.com/web";

pub fn js_url() -> String {
    format!("{JS_BASE_URL}/{JS_SDK_VERSION}/js")
}

fn billing_field(spec: &BillingFieldSpec, config: &FieldSettings, value: String) -> FormField {
    FormField {
        name: spec.field.as_str().to_string(),
        title: spec.title.to_string(),
        kind: spec.kind,
        value,
        required: config.required,
        gateway_field: Some(spec.gateway_field),
        options: match spec.kind {
            FieldKind::Select => COUNTRIES,
            _ => &[],
        },
        attributes: BTreeMap::new(),
    }
}

/// Renders the enabled billing fields.
///
/// Each field is prefilled from the context first; the display decision is
/// then made on that prefilled value. Fields that are not displayed are
/// concealed but keep their value.
pub fn render_billing_fields(settings: &InputSettings, context: &dyn PaymentContext) -> Container {
    let fields = BILLING_FIELDS
        .iter()
        .filter_map(|spec| {
            let config = settings.billing(spec.field);
            if !config.enabled {
                return None;
            }
            let mut field = billing_field(spec, &config, prefill(&config.keys, context));
            if !config.display.shows(&field.value) {
                field.conceal();
            }
            Some(field)
        })
        .collect();
    Container { fields }
}

/// Renders the contact fields (currently only the email address).
pub fn render_extra_data(settings: &InputSettings, context: &dyn PaymentContext) -> Container {
    let config = &settings.email;
    if !config.enabled {
        return Container::default();
    }
    let mut email = FormField {
        name: "email".to_string(),
        title: "Email".to_string(),
        kind: FieldKind::Text,
        value: prefill(&config.keys, context),
        required: config.required,
        gateway_field: None,
        options: &[],
        attributes: BTreeMap::new(),
    };
    if !config.display.shows(&email.value) {
        email.conceal();
    }
    Container {
        fields: vec![email],
    }
}

fn scripts(kind: MethodKind) -> Vec<ScriptAttachment> {
    let base_url = js_url();
    let mut scripts = match kind {
        MethodKind::CreditCard => vec![
            ScriptAttachment::library(format!("{base_url}/client.min.js")),
            ScriptAttachment::library(format!("{base_url}/hosted-fields.min.js")),
        ],
        MethodKind::GooglePay => vec![
            ScriptAttachment::library(GOOGLE_PAY_JS),
            ScriptAttachment::library(format!("{base_url}/client.min.js")),
            ScriptAttachment::library(format!("{base_url}/google-payment.min.js")),
        ],
    };
    scripts.push(ScriptAttachment {
        url: MODULE_SCRIPT.to_string(),
        kind: ScriptKind::File,
        group: ScriptGroup::Default,
    });
    scripts
}

/// Builds the complete payment form for `method`.
pub fn build_form(
    method: &PaymentMethod,
    payment: &Payment,
    token: ClientToken,
    context: &dyn PaymentContext,
) -> Result<PaymentForm, ValidationError> {
    let settings = &method.config.input_settings;
    let mut form = PaymentForm {
        pmid: method.pmid,
        nonce: FormField::hidden(NONCE_FIELD, ""),
        settings: BTreeMap::from([(
            PaymentForm::settings_key(method.pmid),
            ClientSettings {
                payment_token: token.0,
                pmid: method.pmid,
                transaction_info: None,
            },
        )]),
        scripts: scripts(method.kind),
        extra_data: render_extra_data(settings, context),
        billing_data: render_billing_fields(settings, context),
    };

    if method.kind == MethodKind::GooglePay
        && let Some(client) = form.client_settings_mut()
    {
        client.transaction_info = Some(TransactionInfo {
            currency_code: payment.currency_code.clone(),
            total_price_status: "FINAL",
            total_price: payment.total_amount()?.to_string(),
        });
    }
    Ok(form)
}

fn submitted_value<'a>(field: &'a FormField, submission: &'a FormSubmission) -> &'a str {
    // Concealed fields are not interactive, their rendered value is authoritative.
    if field.is_hidden() {
        &field.value
    } else {
        submission.value(&field.name)
    }
}

fn require(field: &FormField, value: &str, errors: &mut FormErrors) {
    if field.required && value.is_empty() {
        errors.push(
            field.name.clone(),
            format!("{} field is required.", field.title),
        );
    }
}

/// Message for a select value that is not one of the offered options.
pub const ILLEGAL_CHOICE: &str = "An illegal choice has been detected.";

fn check_choice(field: &FormField, value: &str, errors: &mut FormErrors) {
    if field.kind == FieldKind::Select
        && !field.is_hidden()
        && !value.is_empty()
        && !is_country_code(value)
    {
        errors.push(field.name.clone(), ILLEGAL_CHOICE);
    }
}

/// Validates a submitted form and stores the results in the payment's method data.
///
/// Every required field left empty and every visible select holding a value
/// outside its options is reported. On success the billing map
/// holds the non-empty values keyed by gateway field, padded with all
/// canonical billing keys.
pub fn validate_submission(
    form: &PaymentForm,
    submission: &FormSubmission,
    payment: &mut Payment,
) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    let mut billing = BTreeMap::new();
    for field in &form.billing_data.fields {
        let value = submitted_value(field, submission);
        require(field, value, &mut errors);
        check_choice(field, value, &mut errors);
        if let Some(gateway_field) = field.gateway_field
            && !value.is_empty()
        {
            billing.insert(gateway_field.to_string(), value.to_string());
        }
    }
    for key in CANONICAL_BILLING_KEYS {
        billing.entry(key.to_string()).or_default();
    }

    let mut email = None;
    if let Some(field) = form.extra_data.get("email") {
        let value = submitted_value(field, submission);
        require(field, value, &mut errors);
        email = Some(value.to_string()).filter(|v| !v.is_empty());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    payment.method_data.nonce = submission.value(NONCE_FIELD).to_string();
    payment.method_data.billing_data = billing;
    payment.method_data.email = email;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{InputSettingsPatch, MethodConfiguration};
    use crate::domain::fields::{BillingField, DisplayMode};
    use crate::infrastructure::in_memory::{MapContext, NullContext};
    use rust_decimal_macros::dec;

    fn settings_with(field: BillingField, display: DisplayMode, required: bool) -> InputSettings {
        let mut settings = InputSettings::default();
        let config = settings.billing_address.get_mut(&field).unwrap();
        config.display = display;
        config.required = required;
        settings
    }

    fn method(kind: MethodKind) -> PaymentMethod {
        PaymentMethod::new(7, kind, MethodConfiguration::default())
    }

    fn payment() -> Payment {
        let mut payment = Payment::new("test payment", "EUR");
        payment.line_items.push(crate::domain::payment::LineItem {
            name: "donation".into(),
            description: String::new(),
            amount: dec!(12.50),
            quantity: 2,
            tax_rate: dec!(0),
            recurrence: None,
        });
        payment
    }

    #[test]
    fn test_always_field_is_visible_with_prefill() {
        let settings = settings_with(BillingField::City, DisplayMode::Always, false);
        let context = MapContext::from([("city", "Vienna")]);
        let container = render_billing_fields(&settings, &context);

        let city = container.get("city").unwrap();
        assert_eq!(city.kind, FieldKind::Text);
        assert_eq!(city.value, "Vienna");
    }

    #[test]
    fn test_if_not_set_depends_on_prefill() {
        let settings = settings_with(BillingField::City, DisplayMode::IfNotSet, false);

        let prefilled = render_billing_fields(&settings, &MapContext::from([("city", "Vienna")]));
        assert!(prefilled.get("city").unwrap().is_hidden());

        let empty = render_billing_fields(&settings, &NullContext);
        assert_eq!(empty.get("city").unwrap().kind, FieldKind::Text);
    }

    #[test]
    fn test_hidden_field_keeps_value_and_braintree_name() {
        let settings = InputSettings::default();
        let context = MapContext::from([("zip_code", "1010")]);
        let container = render_billing_fields(&settings, &context);

        let postcode = container.get("postcode").unwrap();
        assert!(postcode.is_hidden());
        assert_eq!(postcode.value, "1010");
        assert_eq!(
            postcode.attributes.get("data-braintree-name").map(String::as_str),
            Some("postalCode")
        );
    }

    #[test]
    fn test_visible_country_offers_options() {
        let settings = settings_with(BillingField::Country, DisplayMode::Always, false);
        let container = render_billing_fields(&settings, &NullContext);
        let country = container.get("country").unwrap();
        assert_eq!(country.kind, FieldKind::Select);
        assert!(!country.options.is_empty());
    }

    #[test]
    fn test_disabled_field_not_rendered() {
        let mut settings = InputSettings::default();
        settings
            .billing_address
            .get_mut(&BillingField::Company)
            .unwrap()
            .enabled = false;
        let container = render_billing_fields(&settings, &NullContext);
        assert!(container.get("company").is_none());
        assert_eq!(container.fields.len(), 8);
    }

    #[test]
    fn test_form_with_empty_context_has_containers() {
        let form = build_form(
            &method(MethodKind::CreditCard),
            &payment(),
            ClientToken("token".into()),
            &NullContext,
        )
        .unwrap();

        assert!(form.extra_data.get("email").is_some());
        assert_eq!(form.billing_data.fields.len(), 9);
        assert_eq!(form.nonce.name, NONCE_FIELD);
        let client = form.client_settings().unwrap();
        assert_eq!(client.payment_token, "token");
        assert_eq!(client.pmid, 7);
        assert!(client.transaction_info.is_none());
        assert!(
            form.scripts
                .iter()
                .any(|s| s.url.ends_with("3.50.0/js/hosted-fields.min.js"))
        );
    }

    #[test]
    fn test_google_pay_form_adds_transaction_info() {
        let form = build_form(
            &method(MethodKind::GooglePay),
            &payment(),
            ClientToken("token".into()),
            &NullContext,
        )
        .unwrap();

        let info = form.client_settings().unwrap().transaction_info.clone().unwrap();
        assert_eq!(info.currency_code, "EUR");
        assert_eq!(info.total_price_status, "FINAL");
        assert_eq!(info.total_price, "25.00");
        assert!(form.scripts.iter().any(|s| s.url == GOOGLE_PAY_JS));
        assert!(
            form.scripts
                .iter()
                .any(|s| s.url.ends_with("google-payment.min.js"))
        );

        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(
            json["settings"]["pmid_7"]["transactionInfo"]["totalPriceStatus"],
            "FINAL"
        );
    }

    #[test]
    fn test_validate_collects_required_errors() {
        let mut settings = settings_with(BillingField::FirstName, DisplayMode::Always, true);
        let city = settings.billing_address.get_mut(&BillingField::City).unwrap();
        city.required = true;
        let mut method = method(MethodKind::CreditCard);
        method.config.input_settings = settings;

        let form = build_form(&method, &payment(), ClientToken("t".into()), &NullContext).unwrap();
        let mut payment = payment();
        let errors =
            validate_submission(&form, &FormSubmission::default(), &mut payment).unwrap_err();

        assert_eq!(errors.0.len(), 2);
        assert_eq!(
            errors.for_field("first_name").unwrap().message,
            "First name field is required."
        );
        assert_eq!(
            errors.for_field("city").unwrap().message,
            "City/Locality field is required."
        );
        assert!(payment.method_data.nonce.is_empty());
    }

    #[test]
    fn test_validate_pads_canonical_billing_keys() {
        let mut method = method(MethodKind::CreditCard);
        method.config.input_settings =
            settings_with(BillingField::LastName, DisplayMode::Always, false);
        let context = MapContext::from([("first_name", "Ada")]);
        let form = build_form(&method, &payment(), ClientToken("t".into()), &context).unwrap();

        let submission = FormSubmission::default()
            .with(NONCE_FIELD, "fake-valid-nonce")
            .with("last_name", "Lovelace")
            // Concealed fields ignore submitted values.
            .with("first_name", "Mallory");
        let mut payment = payment();
        validate_submission(&form, &submission, &mut payment).unwrap();

        let billing = &payment.method_data.billing_data;
        assert_eq!(billing.len(), CANONICAL_BILLING_KEYS.len());
        assert_eq!(billing["firstName"], "Ada");
        assert_eq!(billing["lastName"], "Lovelace");
        assert_eq!(billing["locality"], "");
        assert_eq!(billing["countryCodeAlpha2"], "");
        assert_eq!(payment.method_data.nonce, "fake-valid-nonce");
        assert_eq!(payment.method_data.email, None);
    }

    #[test]
    fn test_validate_passes_email_from_context() {
        let patch: InputSettingsPatch =
            serde_json::from_str(r#"{ "email": { "required": true } }"#).unwrap();
        let mut method = method(MethodKind::CreditCard);
        method.config.input_settings = patch.resolve(&InputSettings::default());

        let context = MapContext::from([("email", "ada@example.com")]);
        let form = build_form(&method, &payment(), ClientToken("t".into()), &context).unwrap();
        let mut payment = payment();
        validate_submission(&form, &FormSubmission::default(), &mut payment).unwrap();
        assert_eq!(
            payment.method_data.email.as_deref(),
            Some("ada@example.com")
        );
    }

    #[test]
    fn test_validate_rejects_unknown_country() {
        let mut method = method(MethodKind::CreditCard);
        method.config.input_settings =
            settings_with(BillingField::Country, DisplayMode::Always, false);
        let form = build_form(&method, &payment(), ClientToken("t".into()), &NullContext).unwrap();

        let submission = FormSubmission::default()
            .with(NONCE_FIELD, "fake-valid-nonce")
            .with("country", "Not A Country");
        let mut payment = payment();
        let errors = validate_submission(&form, &submission, &mut payment).unwrap_err();

        assert_eq!(errors.for_field("country").unwrap().message, ILLEGAL_CHOICE);
        assert!(payment.method_data.billing_data.is_empty());

        let submission = FormSubmission::default()
            .with(NONCE_FIELD, "fake-valid-nonce")
            .with("country", "AT");
        validate_submission(&form, &submission, &mut payment).unwrap();
        assert_eq!(payment.method_data.billing_data["countryCodeAlpha2"], "AT");
    }
}
