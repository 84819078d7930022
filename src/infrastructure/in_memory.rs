use crate::domain::payment::Payment;
use crate::domain::ports::{EventLog, LogEntry, Notifier, PaymentContext, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payments.
///
/// Uses `Arc<RwLock<..>>` so clones share the same payments. Ideal for testing
/// or when persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    payments: HashMap<u64, Payment>,
    last_pid: u64,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn save(&self, payment: &mut Payment) -> Result<()> {
        let mut inner = self.inner.write().await;
        let pid = match payment.pid {
            Some(pid) => pid,
            None => {
                let pid = inner.last_pid + 1;
                payment.pid = Some(pid);
                pid
            }
        };
        inner.last_pid = inner.last_pid.max(pid);
        inner.payments.insert(pid, payment.clone());
        Ok(())
    }

    async fn get(&self, pid: u64) -> Result<Option<Payment>> {
        let inner = self.inner.read().await;
        Ok(inner.payments.get(&pid).cloned())
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        let inner = self.inner.read().await;
        let mut payments: Vec<Payment> = inner.payments.values().cloned().collect();
        payments.sort_by_key(|p| p.pid);
        Ok(payments)
    }
}

/// Collects log entries instead of emitting them.
#[derive(Default)]
pub struct InMemoryEventLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventLog for InMemoryEventLog {
    fn log(&self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

/// Collects user-facing messages, e.g. for a host to display after the request.
#[derive(Default)]
pub struct InMemoryNotifier {
    messages: Mutex<Vec<String>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// A payment context backed by a plain map.
#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(transparent)]
pub struct MapContext {
    values: HashMap<String, String>,
}

impl MapContext {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapContext {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl PaymentContext for MapContext {
    fn value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// A payment context that knows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullContext;

impl PaymentContext for NullContext {
    fn value(&self, _key: &str) -> Option<String> {
        None
    }
}
