//! Event Registration Service Library
//!
//! HTTP backend that accepts event registrations (with an optional payment
//! proof upload), stores them with roll number and transaction id
//! uniqueness, and lists them back.
//!
//! ## Modules
//!
//! - [`domain`] - Registration entity, submission form and validation
//! - [`infra`] - Record stores (PostgreSQL, SQLite) and upload storage
//! - [`api`] - REST API routes and error responses
//! - [`server`] - Configuration and HTTP server bootstrap
//! - [`migrations`] - Embedded database migrations

pub mod api;
pub mod domain;
pub mod infra;
pub mod migrations;
pub mod server;

// Re-export commonly used types
pub use domain::{NewRegistration, Registration, RegistrationForm, RegistrationId};

pub use infra::{BlobStore, RegistrationError, RegistrationStore, Result};
