use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_lists_empty_store() {
    let mut cmd = Command::new(cargo_bin!("braintree-payment"));
    cmd.arg("payments");

    cmd.assert()
        .success()
        .stdout("pid,status,amount,currency,braintree_id,type\n");
}

#[test]
fn test_cli_rejects_invalid_config() {
    let mut cmd = Command::new(cargo_bin!("braintree-payment"));
    cmd.args(["--config", "tests/fixtures/invalid.toml", "client-token"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_cli_rejects_recurring_payment_before_contacting_gateway() {
    let mut cmd = Command::new(cargo_bin!("braintree-payment"));
    cmd.args([
        "--config",
        "tests/fixtures/method.toml",
        "pay",
        "--payment",
        "tests/fixtures/recurring_payment.json",
        "--nonce",
        "fake-valid-nonce",
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(
            "Recurrent payments are disabled for this payment method.",
        ));
}

#[test]
fn test_cli_rejects_malformed_field_argument() {
    let mut cmd = Command::new(cargo_bin!("braintree-payment"));
    cmd.args([
        "pay",
        "--payment",
        "tests/fixtures/recurring_payment.json",
        "--nonce",
        "n",
        "--field",
        "no-separator",
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("expected name=value"));
}

#[test]
fn test_cli_reports_overflowing_amount() {
    let mut cmd = Command::new(cargo_bin!("braintree-payment"));
    cmd.args([
        "pay",
        "--payment",
        "tests/fixtures/overflow_payment.json",
        "--nonce",
        "fake-valid-nonce",
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("The payment total must be positive"))
        .stderr(predicate::str::contains("panicked").not());
}
