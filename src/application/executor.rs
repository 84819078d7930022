use crate::domain::method::PaymentMethod;
use crate::domain::payment::{Payment, PaymentStatus, TransactionMetadata};
use crate::domain::ports::{EventLogRef, LogEntry, NotifierRef, PaymentGatewayRef, PaymentStoreRef};
use crate::domain::transaction::{SaleRequest, TransactionResult};
use crate::error::{Result, ValidationError};
use tracing::{debug, info};

pub const LOG_SCOPE: &str = "braintree_payment";

pub const FAILURE_TEMPLATE: &str = "@method payment method encountered an error while contacting \
the braintree server. The status code \"@status\" and the error message \"@message\". \
(pid: @pid, pmid: @pmid)";

/// Submits a sale for a validated payment and records the outcome.
///
/// The gateway is called exactly once per execution, without retries. A
/// completed call always leaves the payment persisted as either
/// [`PaymentStatus::Success`] or [`PaymentStatus::Failed`]; only transport
/// errors propagate to the caller.
pub struct TransactionExecutor {
    gateway: PaymentGatewayRef,
    store: PaymentStoreRef,
    log: EventLogRef,
    notifier: NotifierRef,
}

impl TransactionExecutor {
    pub fn new(
        gateway: PaymentGatewayRef,
        store: PaymentStoreRef,
        log: EventLogRef,
        notifier: NotifierRef,
    ) -> Self {
        Self {
            gateway,
            store,
            log,
            notifier,
        }
    }

    pub fn sale_request(
        payment: &Payment,
        method: &PaymentMethod,
    ) -> std::result::Result<SaleRequest, ValidationError> {
        Ok(SaleRequest {
            amount: payment.total_amount()?,
            currency_code: payment.currency_code.clone(),
            payment_method_nonce: payment.method_data.nonce.clone(),
            billing: payment.method_data.billing_data.clone(),
            customer_email: payment.method_data.email.clone(),
            submit_for_settlement: true,
            merchant_account_id: method.config.merchant_account().map(str::to_string),
        })
    }

    pub async fn execute(
        &self,
        payment: &mut Payment,
        method: &PaymentMethod,
    ) -> Result<PaymentStatus> {
        if payment.method_data.nonce.is_empty() {
            return Err(ValidationError::MissingNonce.into());
        }

        let request = Self::sale_request(payment, method)?;
        debug!(
            amount = %request.amount,
            currency = %request.currency_code,
            merchant_account = ?request.merchant_account_id,
            "Submitting sale"
        );
        let result = self.gateway.sale(request).await?;

        let status = if result.is_settled() {
            self.record_success(payment, &result).await?
        } else {
            self.record_failure(payment, method, &result).await?
        };
        info!(pid = ?payment.pid, status = status.as_str(), "Payment executed");
        Ok(status)
    }

    async fn record_success(
        &self,
        payment: &mut Payment,
        result: &TransactionResult,
    ) -> Result<PaymentStatus> {
        if let Some(tx) = &result.transaction {
            payment.braintree = Some(TransactionMetadata {
                braintree_id: tx.id.clone(),
                r#type: tx.payment_instrument_type.clone(),
                plan_id: None,
            });
        }
        payment.set_status(PaymentStatus::Success);
        self.store.save(payment).await?;
        Ok(PaymentStatus::Success)
    }

    async fn record_failure(
        &self,
        payment: &mut Payment,
        method: &PaymentMethod,
        result: &TransactionResult,
    ) -> Result<PaymentStatus> {
        payment.set_status(PaymentStatus::Failed);
        self.store.save(payment).await?;

        self.notifier.notify(&result.message);
        self.log.log(LogEntry {
            scope: LOG_SCOPE,
            template: FAILURE_TEMPLATE,
            variables: vec![
                ("@status", result.status_code().to_string()),
                ("@message", result.message.clone()),
                (
                    "@pid",
                    payment.pid.map(|pid| pid.to_string()).unwrap_or_default(),
                ),
                ("@pmid", method.pmid.to_string()),
                ("@method", method.title_specific.clone()),
            ],
        });
        Ok(PaymentStatus::Failed)
    }
}
