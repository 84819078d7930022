use super::executor::TransactionExecutor;
use super::forms;
use crate::domain::form::{FormSubmission, PaymentForm};
use crate::domain::method::PaymentMethod;
use crate::domain::payment::{Amount, Payment, PaymentStatus, is_currency_code};
use crate::domain::ports::{
    EventLogRef, NotifierRef, PaymentContext, PaymentGatewayRef, PaymentStoreRef,
};
use crate::domain::transaction::ClientToken;
use crate::error::{Result, ValidationError};
use tracing::debug;

/// Controller of one Braintree payment method.
///
/// Holds the method configuration and the collaborators used by the whole
/// payment flow: client token issuance at render time, form validation,
/// payment validation and execution.
pub struct MethodController {
    method: PaymentMethod,
    gateway: Option<PaymentGatewayRef>,
    store: PaymentStoreRef,
    log: EventLogRef,
    notifier: NotifierRef,
}

impl MethodController {
    /// Creates a new controller.
    ///
    /// # Arguments
    ///
    /// * `method` - The configured payment method.
    /// * `gateway` - The gateway client, `None` if it could not be created.
    /// * `store` - Where executed payments are persisted.
    /// * `log` - Receives structured entries for failed transactions.
    /// * `notifier` - Receives user-facing messages.
    pub fn new(
        method: PaymentMethod,
        gateway: Option<PaymentGatewayRef>,
        store: PaymentStoreRef,
        log: EventLogRef,
        notifier: NotifierRef,
    ) -> Self {
        Self {
            method,
            gateway,
            store,
            log,
            notifier,
        }
    }

    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    pub fn title(&self) -> &'static str {
        self.method.kind.title()
    }

    fn gateway(&self) -> std::result::Result<&PaymentGatewayRef, ValidationError> {
        self.gateway
            .as_ref()
            .ok_or(ValidationError::GatewayUnavailable)
    }

    /// Checks that the payment can be submitted with this method.
    ///
    /// Never contacts the gateway.
    pub fn validate(&self, payment: &Payment, strict: bool) -> Result<()> {
        self.gateway()?;

        if strict && payment.line_items.is_empty() {
            return Err(ValidationError::NoLineItems.into());
        }
        if !is_currency_code(&payment.currency_code) {
            return Err(ValidationError::InvalidCurrency(payment.currency_code.clone()).into());
        }
        Amount::new(payment.total_amount()?)?;

        if !self.method.config.enable_recurrent_payments && payment.has_recurring_items() {
            return Err(ValidationError::RecurringPaymentsDisabled.into());
        }
        Ok(())
    }

    /// Requests a fresh client token for the browser SDK.
    pub async fn client_token(&self) -> Result<ClientToken> {
        let merchant_account = self.method.config.merchant_account().map(str::to_string);
        debug!(pmid = self.method.pmid, "Requesting client token");
        Ok(self.gateway()?.client_token(merchant_account).await?)
    }

    pub async fn payment_form(
        &self,
        payment: &Payment,
        context: &dyn PaymentContext,
    ) -> Result<PaymentForm> {
        let token = self.client_token().await?;
        Ok(forms::build_form(&self.method, payment, token, context)?)
    }

    /// Validates the submitted form and copies its data into the payment.
    pub fn validate_form(
        &self,
        form: &PaymentForm,
        submission: &FormSubmission,
        payment: &mut Payment,
    ) -> Result<()> {
        forms::validate_submission(form, submission, payment).map_err(ValidationError::Fields)?;
        Ok(())
    }

    pub async fn execute(&self, payment: &mut Payment) -> Result<PaymentStatus> {
        let executor = TransactionExecutor::new(
            self.gateway()?.clone(),
            self.store.clone(),
            self.log.clone(),
            self.notifier.clone(),
        );
        executor.execute(payment, &self.method).await
    }
}
