//! Domain models for the registration service
//!
//! The registration entity, the raw submission form and its validation.

mod registration;
mod types;

pub use registration::*;
pub use types::*;
