//! API layer for the registration service
//!
//! REST endpoints for submitting and listing registrations, plus health
//! probes and the structured error responses they share.

pub mod error;
pub mod handlers;
mod rest;
pub mod types;

pub use rest::*;
