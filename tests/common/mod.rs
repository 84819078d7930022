#![allow(dead_code)]

use async_trait::async_trait;
use braintree_payment::application::controller::MethodController;
use braintree_payment::domain::config::MethodConfiguration;
use braintree_payment::domain::method::{MethodKind, PaymentMethod};
use braintree_payment::domain::payment::{LineItem, Payment, Recurrence};
use braintree_payment::domain::ports::PaymentGateway;
use braintree_payment::domain::transaction::{
    ClientToken, GatewayTransaction, SUBMITTED_FOR_SETTLEMENT, SaleRequest, TransactionResult,
};
use braintree_payment::error::GatewayError;
use braintree_payment::infrastructure::in_memory::{
    InMemoryEventLog, InMemoryNotifier, InMemoryPaymentStore,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Gateway double returning a canned sale result and recording every call.
pub struct FakeGateway {
    result: TransactionResult,
    token_calls: AtomicUsize,
    requests: Mutex<Vec<SaleRequest>>,
}

impl FakeGateway {
    pub fn returning(result: TransactionResult) -> Self {
        Self {
            result,
            token_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn settled(id: &str) -> Self {
        Self::returning(TransactionResult {
            success: true,
            code: None,
            message: String::new(),
            transaction: Some(GatewayTransaction {
                id: id.to_string(),
                status: SUBMITTED_FOR_SETTLEMENT.to_string(),
                payment_instrument_type: "credit_card".to_string(),
            }),
        })
    }

    pub fn declined(code: &str, message: &str) -> Self {
        Self::returning(TransactionResult {
            success: false,
            code: Some(code.to_string()),
            message: message.to_string(),
            transaction: None,
        })
    }

    pub fn sale_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SaleRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn client_token(
        &self,
        _merchant_account_id: Option<String>,
    ) -> Result<ClientToken, GatewayError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ClientToken("fake-client-token".to_string()))
    }

    async fn sale(&self, request: SaleRequest) -> Result<TransactionResult, GatewayError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.result.clone())
    }
}

pub struct Harness {
    pub controller: MethodController,
    pub gateway: Arc<FakeGateway>,
    pub store: Arc<InMemoryPaymentStore>,
    pub log: Arc<InMemoryEventLog>,
    pub notifier: Arc<InMemoryNotifier>,
}

pub fn harness(kind: MethodKind, config: MethodConfiguration, gateway: FakeGateway) -> Harness {
    let gateway = Arc::new(gateway);
    let store = Arc::new(InMemoryPaymentStore::new());
    let log = Arc::new(InMemoryEventLog::new());
    let notifier = Arc::new(InMemoryNotifier::new());
    let controller = MethodController::new(
        PaymentMethod::new(3, kind, config),
        Some(gateway.clone()),
        store.clone(),
        log.clone(),
        notifier.clone(),
    );
    Harness {
        controller,
        gateway,
        store,
        log,
        notifier,
    }
}

pub fn item(amount: Decimal, quantity: u32) -> LineItem {
    LineItem {
        name: "item".to_string(),
        description: String::new(),
        amount,
        quantity,
        tax_rate: Decimal::ZERO,
        recurrence: None,
    }
}

pub fn recurring_item(amount: Decimal) -> LineItem {
    LineItem {
        recurrence: Some(Recurrence {
            interval_unit: Some("month".to_string()),
            interval_value: 1,
        }),
        ..item(amount, 1)
    }
}

pub fn payment(items: Vec<LineItem>) -> Payment {
    let mut payment = Payment::new("integration payment", "EUR");
    payment.line_items = items;
    payment
}
