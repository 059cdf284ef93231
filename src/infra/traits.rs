//! Trait definitions for the registration service collaborators

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{NewRegistration, Registration};

use super::Result;

/// Record store for registrations.
///
/// Invariant: no two records share a roll number, and no two share a
/// transaction id. Implementations enforce this with storage-level unique
/// constraints; [`RegistrationStore::exists_conflicting`] is only a fast path.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Check whether any record already uses this roll number or this
    /// transaction id.
    async fn exists_conflicting(&self, roll_number: &str, transaction_id: &str) -> Result<bool>;

    /// Persist a new registration
    ///
    /// Fails with `RegistrationError::Duplicate` when a unique constraint
    /// rejects the row.
    async fn insert(&self, new: NewRegistration) -> Result<Registration>;

    /// All registrations, oldest first
    async fn list(&self) -> Result<Vec<Registration>>;

    /// Round-trip to the backing database
    async fn ping(&self) -> Result<()>;
}

/// Storage for uploaded payment proofs
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under a fresh collision-resistant name and return its
    /// public path (e.g. `uploads/<name>`).
    ///
    /// `original_name` is the client-supplied filename; only its extension
    /// is kept.
    async fn put(&self, original_name: Option<String>, bytes: Vec<u8>) -> Result<String>;

    /// Remove a blob previously returned by [`BlobStore::put`]
    async fn remove(&self, public_path: &str) -> Result<()>;
}
