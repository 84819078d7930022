//! Domain layer: entities, configuration and the ports implemented by adapters.

pub mod config;
pub mod countries;
pub mod fields;
pub mod form;
pub mod method;
pub mod payment;
pub mod ports;
pub mod transaction;
