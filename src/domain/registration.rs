//! Registration entity and submission validation
//!
//! A [`RegistrationForm`] is what arrives over the wire: any of its fields may
//! be missing. [`RegistrationForm::validate`] turns it into a
//! [`NewRegistration`] whose fields are trimmed and non-empty. The stores only
//! ever accept `NewRegistration`, so nothing unvalidated reaches them.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{FormField, RegistrationId, MAX_FIELD_LEN};

/// A persisted event registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: RegistrationId,
    pub name: String,
    pub roll_number: String,
    pub section: String,
    pub department: String,
    pub year: String,
    pub transaction_id: String,
    /// Public path of the uploaded payment proof, if one was attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Materialize a new record from validated input.
    ///
    /// Registrations are never updated, so both timestamps start equal.
    /// Timestamps are truncated to microseconds, the precision both stores
    /// keep.
    pub fn create(new: NewRegistration) -> Self {
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: RegistrationId::new(),
            name: new.name,
            roll_number: new.roll_number,
            section: new.section,
            department: new.department,
            year: new.year,
            transaction_id: new.transaction_id,
            payment_proof: new.payment_proof,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Raw text fields of a submission, as received
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub section: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub transaction_id: Option<String>,
}

/// Validated submission, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub name: String,
    pub roll_number: String,
    pub section: String,
    pub department: String,
    pub year: String,
    pub transaction_id: String,
    pub payment_proof: Option<String>,
}

impl NewRegistration {
    pub fn with_payment_proof(mut self, path: impl Into<String>) -> Self {
        self.payment_proof = Some(path.into());
        self
    }
}

/// Rejection reasons for a submission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(FormField),

    #[error("Field {field} must be at most {max} characters")]
    FieldTooLong { field: FormField, max: usize },
}

impl ValidationError {
    pub fn field(&self) -> FormField {
        match self {
            ValidationError::MissingField(field) => *field,
            ValidationError::FieldTooLong { field, .. } => *field,
        }
    }
}

impl RegistrationForm {
    /// Set a text field by its wire name. Returns `false` for names that are
    /// not text fields of the form.
    pub fn set(&mut self, field: FormField, value: String) -> bool {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::RollNumber => &mut self.roll_number,
            FormField::Section => &mut self.section,
            FormField::Department => &mut self.department,
            FormField::Year => &mut self.year,
            FormField::TransactionId => &mut self.transaction_id,
            FormField::PaymentProof => return false,
        };
        *slot = Some(value);
        true
    }

    /// Trim every field and reject missing, blank or oversized ones.
    ///
    /// Fields are checked in [`FormField::REQUIRED`] order and the first
    /// failure is reported.
    pub fn validate(self) -> Result<NewRegistration, ValidationError> {
        Ok(NewRegistration {
            name: required(FormField::Name, self.name)?,
            roll_number: required(FormField::RollNumber, self.roll_number)?,
            section: required(FormField::Section, self.section)?,
            department: required(FormField::Department, self.department)?,
            year: required(FormField::Year, self.year)?,
            transaction_id: required(FormField::TransactionId, self.transaction_id)?,
            payment_proof: None,
        })
    }
}

fn required(field: FormField, value: Option<String>) -> Result<String, ValidationError> {
    let value = value.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(ValidationError::FieldTooLong {
            field,
            max: MAX_FIELD_LEN,
        });
    }
    Ok(value.to_string())
}
