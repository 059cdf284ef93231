//! REST API handlers organized by domain.

pub mod health;
pub mod registrations;

pub use health::*;
pub use registrations::*;
