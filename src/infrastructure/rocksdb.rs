use crate::domain::payment::Payment;
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing payments.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent payment store using RocksDB.
///
/// Payments are stored as JSON keyed by the big-endian `pid`, so iteration
/// order is pid order and the last key is the highest pid.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBPaymentStore {
    db: Arc<DB>,
}

impl RocksDBPaymentStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments]).map_err(storage_error)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn payments_cf(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_PAYMENTS)
            .ok_or_else(|| PaymentError::Storage("Payments column family not found".to_string()))
    }

    fn last_pid(&self) -> Result<u64> {
        let cf = self.payments_cf()?;
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (key, _) = item.map_err(storage_error)?;
                let bytes = <[u8; 8]>::try_from(&key[..])
                    .map_err(|_| PaymentError::Storage("Invalid payment key".to_string()))?;
                Ok(u64::from_be_bytes(bytes))
            }
            None => Ok(0),
        }
    }
}

fn storage_error(e: rocksdb::Error) -> PaymentError {
    PaymentError::Storage(e.to_string())
}

#[async_trait]
impl PaymentStore for RocksDBPaymentStore {
    async fn save(&self, payment: &mut Payment) -> Result<()> {
        let pid = match payment.pid {
            Some(pid) => pid,
            None => self.last_pid()? + 1,
        };
        payment.pid = Some(pid);

        let value = serde_json::to_vec(payment)?;
        self.db
            .put_cf(self.payments_cf()?, pid.to_be_bytes(), value)
            .map_err(storage_error)
    }

    async fn get(&self, pid: u64) -> Result<Option<Payment>> {
        let result = self
            .db
            .get_cf(self.payments_cf()?, pid.to_be_bytes())
            .map_err(storage_error)?;

        match result {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        let mut payments = Vec::new();
        for item in self.db.iterator_cf(self.payments_cf()?, IteratorMode::Start) {
            let (_key, value) = item.map_err(storage_error)?;
            payments.push(serde_json::from_slice(&value)?);
        }
        Ok(payments)
    }
}
