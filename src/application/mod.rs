//! Application layer orchestrating the payment flow.
//!
//! `MethodController` is the entry point used by a host: it issues client
//! tokens, renders and validates the payment form, validates the payment and
//! hands it to the `TransactionExecutor`.

pub mod controller;
pub mod executor;
pub mod forms;
