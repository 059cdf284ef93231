//! Infrastructure layer for the registration service
//!
//! Contains trait definitions and implementations for:
//! - Registration storage (PostgreSQL, SQLite)
//! - Upload storage (local filesystem)
//! - Graceful shutdown (signal handling)

mod blob;
mod error;
mod graceful_shutdown;
pub mod postgres;
pub mod sqlite;
mod traits;

pub use blob::{blob_name, LocalBlobStore, UPLOADS_PREFIX};
pub use error::*;
pub use graceful_shutdown::shutdown_signal;
pub use postgres::PgRegistrationStore;
pub use sqlite::SqliteRegistrationStore;
pub use traits::*;
