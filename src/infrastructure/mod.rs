//! Adapters implementing the domain ports.

pub mod braintree;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod tracing_log;
