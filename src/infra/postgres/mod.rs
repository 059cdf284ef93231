//! PostgreSQL implementations for production registration storage

mod registration_store;

pub use registration_store::*;
