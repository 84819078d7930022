//! Braintree credit card and Google Pay payment method.
//!
//! The crate follows a ports-and-adapters layout:
//!
//! * [`domain`] holds configuration, payment data, form model and the ports.
//! * [`application`] orchestrates form rendering, validation and execution.
//! * [`infrastructure`] provides the Braintree GraphQL client and stores.
//! * [`interfaces`] reads and writes the files the CLI works with.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod observability;
