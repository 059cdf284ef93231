//! SQLite implementations for local development and tests

mod registration_store;

pub use registration_store::*;
