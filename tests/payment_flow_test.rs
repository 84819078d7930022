mod common;

use braintree_payment::domain::config::MethodConfiguration;
use braintree_payment::domain::form::{FormSubmission, NONCE_FIELD};
use braintree_payment::domain::method::MethodKind;
use braintree_payment::domain::payment::PaymentStatus;
use braintree_payment::domain::ports::PaymentStore;
use braintree_payment::error::{PaymentError, ValidationError};
use braintree_payment::infrastructure::in_memory::MapContext;
use common::{FakeGateway, harness, item, payment, recurring_item};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_successful_payment_is_recorded() {
    let h = harness(
        MethodKind::CreditCard,
        MethodConfiguration::default(),
        FakeGateway::settled("bt-123"),
    );
    let mut payment = payment(vec![item(dec!(10.00), 2)]);
    let context = MapContext::from([("first_name", "Ada"), ("email", "ada@example.com")]);

    h.controller.validate(&payment, true).unwrap();
    let form = h.controller.payment_form(&payment, &context).await.unwrap();
    let submission = FormSubmission::default().with(NONCE_FIELD, "fake-valid-nonce");
    h.controller
        .validate_form(&form, &submission, &mut payment)
        .unwrap();

    let status = h.controller.execute(&mut payment).await.unwrap();

    assert_eq!(status, PaymentStatus::Success);
    assert_eq!(h.gateway.token_calls(), 1);
    assert_eq!(h.gateway.sale_calls(), 1);

    let request = &h.gateway.requests()[0];
    assert_eq!(request.amount, dec!(20.00));
    assert_eq!(request.payment_method_nonce, "fake-valid-nonce");
    assert_eq!(request.billing["firstName"], "Ada");
    assert_eq!(request.billing["locality"], "");
    assert_eq!(request.customer_email.as_deref(), Some("ada@example.com"));
    assert!(request.submit_for_settlement);
    assert_eq!(request.merchant_account_id, None);

    let stored = h.store.get(payment.pid.unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.status(), PaymentStatus::Success);
    let metadata = stored.braintree.unwrap();
    assert_eq!(metadata.braintree_id, "bt-123");
    assert_eq!(metadata.r#type, "credit_card");
    assert_eq!(metadata.plan_id, None);

    assert!(h.log.entries().is_empty());
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_declined_payment_is_logged_and_notified() {
    let config = MethodConfiguration {
        merchant_account_id: "eur-account".into(),
        ..MethodConfiguration::default()
    };
    let h = harness(
        MethodKind::CreditCard,
        config,
        FakeGateway::declined("2000", "Do Not Honor"),
    );
    let mut payment = payment(vec![item(dec!(5.00), 1)]);
    payment.method_data.nonce = "fake-processor-declined-visa-nonce".into();

    let status = h.controller.execute(&mut payment).await.unwrap();

    assert_eq!(status, PaymentStatus::Failed);
    assert_eq!(payment.status(), PaymentStatus::Failed);
    assert_eq!(
        h.gateway.requests()[0].merchant_account_id.as_deref(),
        Some("eur-account")
    );

    let stored = h.store.all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status(), PaymentStatus::Failed);
    assert!(stored[0].braintree.is_none());

    assert_eq!(h.notifier.messages(), vec!["Do Not Honor".to_string()]);

    let entries = h.log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].render(),
        "Braintree Credit Card payment method encountered an error while contacting the \
braintree server. The status code \"2000\" and the error message \"Do Not Honor\". \
(pid: 1, pmid: 3)"
    );
}

#[tokio::test]
async fn test_recurring_payment_rejected_without_gateway_call() {
    let h = harness(
        MethodKind::CreditCard,
        MethodConfiguration::default(),
        FakeGateway::settled("unused"),
    );
    let payment = payment(vec![item(dec!(5.00), 1), recurring_item(dec!(3.00))]);

    let err = h.controller.validate(&payment, true).unwrap_err();

    assert!(matches!(
        err,
        PaymentError::Validation(ValidationError::RecurringPaymentsDisabled)
    ));
    assert_eq!(h.gateway.sale_calls(), 0);
    assert_eq!(h.gateway.token_calls(), 0);
    assert!(h.store.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_overflowing_total_is_invalid_amount() {
    let h = harness(
        MethodKind::GooglePay,
        MethodConfiguration::default(),
        FakeGateway::settled("unused"),
    );
    let payment = payment(vec![item(rust_decimal::Decimal::MAX, 2)]);

    let err = h.controller.validate(&payment, true).unwrap_err();
    assert!(matches!(
        err,
        PaymentError::Validation(ValidationError::InvalidAmount)
    ));

    let err = h
        .controller
        .payment_form(&payment, &MapContext::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PaymentError::Validation(ValidationError::InvalidAmount)
    ));
    assert_eq!(h.gateway.sale_calls(), 0);
}

#[tokio::test]
async fn test_recurring_payment_allowed_when_enabled() {
    let config = MethodConfiguration {
        enable_recurrent_payments: true,
        ..MethodConfiguration::default()
    };
    let h = harness(MethodKind::CreditCard, config, FakeGateway::settled("bt-1"));
    let payment = payment(vec![recurring_item(dec!(3.00))]);

    assert!(h.controller.validate(&payment, true).is_ok());
}

#[tokio::test]
async fn test_missing_required_field_blocks_payment() {
    let mut config = MethodConfiguration::default();
    for settings in config.input_settings.billing_address.values_mut() {
        settings.display = braintree_payment::domain::fields::DisplayMode::Always;
    }
    let city = config
        .input_settings
        .billing_address
        .get_mut(&braintree_payment::domain::fields::BillingField::City)
        .unwrap();
    city.required = true;

    let h = harness(MethodKind::CreditCard, config, FakeGateway::settled("bt-1"));
    let mut payment = payment(vec![item(dec!(1.00), 1)]);
    let form = h
        .controller
        .payment_form(&payment, &MapContext::default())
        .await
        .unwrap();

    let submission = FormSubmission::default().with(NONCE_FIELD, "nonce");
    let err = h
        .controller
        .validate_form(&form, &submission, &mut payment)
        .unwrap_err();

    match err {
        PaymentError::Validation(ValidationError::Fields(errors)) => {
            assert_eq!(
                errors.for_field("city").unwrap().message,
                "City/Locality field is required."
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(payment.method_data.nonce.is_empty());
    assert_eq!(h.gateway.sale_calls(), 0);
}

#[tokio::test]
async fn test_google_pay_form_carries_transaction_info() {
    let h = harness(
        MethodKind::GooglePay,
        MethodConfiguration::default(),
        FakeGateway::settled("bt-1"),
    );
    let payment = payment(vec![item(dec!(1.005), 1), item(dec!(2.00), 1)]);

    let form = h
        .controller
        .payment_form(&payment, &MapContext::default())
        .await
        .unwrap();

    let settings = form.client_settings().unwrap();
    assert_eq!(settings.payment_token, "fake-client-token");
    assert_eq!(settings.pmid, 3);
    let info = settings.transaction_info.as_ref().unwrap();
    assert_eq!(info.currency_code, "EUR");
    assert_eq!(info.total_price_status, "FINAL");
    assert_eq!(info.total_price, "3.01");
}
