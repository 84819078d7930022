//! Adapters between the outside world (files, stdin/stdout, environment) and
//! the application layer.

pub mod config_file;
pub mod csv;
pub mod json;
